use serde_json::Value;
use std::sync::Arc;

use crate::api::Payload;
use crate::auth::AuthUser;
use crate::database::models::{Doctor, Patient, PatientFields};
use crate::database::{DatabaseError, RecordStore};
use crate::error::ApiError;

const NAME_MAX_LENGTH: usize = 255;
const GENDER_MAX_LENGTH: usize = 10;

/// Read patient fields from a request body. `current` turns the read into a
/// partial update where absent fields keep their stored values.
pub fn read_patient_fields(body: &Value, current: Option<&Patient>) -> Result<PatientFields, ApiError> {
    let mut payload = Payload::new(body)?;

    let name = payload.string("name", current.map(|p| p.name.as_str()));
    payload.check("name", !name.is_empty(), "This field may not be blank.");
    payload.check(
        "name",
        name.chars().count() <= NAME_MAX_LENGTH,
        format!("Ensure this field has no more than {} characters.", NAME_MAX_LENGTH),
    );

    let age = payload.integer("age", current.map(|p| i64::from(p.age)));
    payload.check("age", age >= 0, "Ensure this value is greater than or equal to 0.");
    payload.check("age", age <= i64::from(i32::MAX), "Ensure this value is a valid integer.");

    let gender = payload.string("gender", current.map(|p| p.gender.as_str()));
    payload.check("gender", !gender.is_empty(), "This field may not be blank.");
    payload.check(
        "gender",
        gender.chars().count() <= GENDER_MAX_LENGTH,
        format!("Ensure this field has no more than {} characters.", GENDER_MAX_LENGTH),
    );

    let medical_history = payload.nullable_string("medical_history", current.and_then(|p| p.medical_history.clone()));

    payload.finish()?;
    Ok(PatientFields {
        name,
        age: age as i32,
        gender,
        medical_history,
    })
}

/// Patient records, scoped to their owning user unless the caller is staff
pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn scope(caller: &AuthUser) -> Option<i64> {
        if caller.is_staff {
            None
        } else {
            Some(caller.user_id)
        }
    }

    fn visible(caller: &AuthUser, patient: &Patient) -> bool {
        caller.is_staff || patient.user == caller.user_id
    }

    pub async fn list(&self, caller: &AuthUser) -> Result<Vec<Patient>, ApiError> {
        Ok(self.store.list_patients(Self::scope(caller)).await?)
    }

    /// The owner is always the caller; any `user` field in the body is ignored
    pub async fn create(&self, caller: &AuthUser, body: &Value) -> Result<Patient, ApiError> {
        let fields = read_patient_fields(body, None)?;

        let patient = self
            .store
            .create_patient(caller.user_id, fields)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => ApiError::conflict("A patient profile already exists for this user"),
                other => other.into(),
            })?;

        tracing::info!("Created patient {} for user {}", patient.id, caller.user_id);
        Ok(patient)
    }

    /// Fetch a patient the caller may see; anything else is reported as missing
    pub async fn retrieve(&self, caller: &AuthUser, id: i64) -> Result<Patient, ApiError> {
        match self.store.patient_by_id(id).await? {
            Some(patient) if Self::visible(caller, &patient) => Ok(patient),
            _ => Err(ApiError::not_found(format!("Patient {} not found", id))),
        }
    }

    /// `partial` is PATCH semantics; otherwise every field must be supplied
    pub async fn update(&self, caller: &AuthUser, id: i64, body: &Value, partial: bool) -> Result<Patient, ApiError> {
        let existing = self.retrieve(caller, id).await?;
        let fields = read_patient_fields(body, partial.then_some(&existing))?;

        self.store
            .update_patient(id, fields)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Patient {} not found", id)))
    }

    pub async fn delete(&self, caller: &AuthUser, id: i64) -> Result<(), ApiError> {
        self.retrieve(caller, id).await?;
        if !self.store.delete_patient(id).await? {
            return Err(ApiError::not_found(format!("Patient {} not found", id)));
        }
        tracing::info!("Deleted patient {}", id);
        Ok(())
    }

    /// Doctors currently assigned to a visible patient
    pub async fn doctors(&self, caller: &AuthUser, id: i64) -> Result<Vec<Doctor>, ApiError> {
        self.retrieve(caller, id).await?;
        Ok(self.store.doctors_for_patient(id).await?)
    }
}
