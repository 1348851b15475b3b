pub mod doctor_service;
pub mod mapping_service;
pub mod patient_service;
pub mod user_service;

pub use doctor_service::DoctorService;
pub use mapping_service::MappingService;
pub use patient_service::PatientService;
pub use user_service::{AccessToken, UserService};
