pub mod doctor;
pub mod mapping;
pub mod patient;
pub mod user;

pub use doctor::{Doctor, DoctorFields};
pub use mapping::{NewMapping, PatientDoctorMapping};
pub use patient::{Patient, PatientFields};
pub use user::{NewUser, User, UserInfo};
