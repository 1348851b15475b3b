use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Doctor, DoctorFields, NewMapping, NewUser, Patient, PatientDoctorMapping, PatientFields, User,
};

/// Data-store handle injected into the services.
///
/// Implementations must provide the relational guarantees the API relies on:
/// - usernames and emails are unique, and so is a patient's owning user
/// - (patient, doctor) mapping pairs are unique
/// - deleting a user removes its patient; deleting a patient or a doctor
///   removes every mapping that references it
/// - inserts referencing a missing row fail with `InvalidReference`
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError>;

    // Patients; `owner = None` lists every patient
    async fn list_patients(&self, owner: Option<i64>) -> Result<Vec<Patient>, DatabaseError>;
    async fn patient_by_id(&self, id: i64) -> Result<Option<Patient>, DatabaseError>;
    async fn create_patient(&self, owner: i64, fields: PatientFields) -> Result<Patient, DatabaseError>;
    async fn update_patient(&self, id: i64, fields: PatientFields) -> Result<Option<Patient>, DatabaseError>;
    async fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError>;

    // Doctors
    async fn list_doctors(&self) -> Result<Vec<Doctor>, DatabaseError>;
    async fn doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, DatabaseError>;
    async fn create_doctor(&self, fields: DoctorFields) -> Result<Doctor, DatabaseError>;
    async fn update_doctor(&self, id: i64, fields: DoctorFields) -> Result<Option<Doctor>, DatabaseError>;
    async fn delete_doctor(&self, id: i64) -> Result<bool, DatabaseError>;

    // Mappings; `owner = Some(user)` restricts to that user's patient
    async fn list_mappings(&self, owner: Option<i64>) -> Result<Vec<PatientDoctorMapping>, DatabaseError>;
    async fn mapping_by_id(&self, id: i64) -> Result<Option<PatientDoctorMapping>, DatabaseError>;
    async fn create_mapping(&self, mapping: NewMapping) -> Result<PatientDoctorMapping, DatabaseError>;
    async fn delete_mapping(&self, id: i64) -> Result<bool, DatabaseError>;
    async fn doctors_for_patient(&self, patient: i64) -> Result<Vec<Doctor>, DatabaseError>;
}
