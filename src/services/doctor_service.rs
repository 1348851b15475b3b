use serde_json::Value;
use std::sync::Arc;

use crate::api::validation::{normalize_email, validate_email_format};
use crate::api::Payload;
use crate::database::models::{Doctor, DoctorFields};
use crate::database::RecordStore;
use crate::error::ApiError;

const TEXT_MAX_LENGTH: usize = 255;

pub fn read_doctor_fields(body: &Value, current: Option<&Doctor>) -> Result<DoctorFields, ApiError> {
    let mut payload = Payload::new(body)?;

    let name = payload.string("name", current.map(|d| d.name.as_str()));
    let specialization = payload.string("specialization", current.map(|d| d.specialization.as_str()));
    for (field, value) in [("name", &name), ("specialization", &specialization)] {
        payload.check(field, !value.is_empty(), "This field may not be blank.");
        payload.check(
            field,
            value.chars().count() <= TEXT_MAX_LENGTH,
            format!("Ensure this field has no more than {} characters.", TEXT_MAX_LENGTH),
        );
    }

    let email = normalize_email(&payload.string("email", current.map(|d| d.email.as_str())));
    if !payload.has_error("email") {
        if let Err(msg) = validate_email_format(&email) {
            payload.check("email", false, msg);
        }
    }

    payload.finish()?;
    Ok(DoctorFields {
        name,
        specialization,
        email,
    })
}

/// Doctors are shared records any authenticated caller may manage
pub struct DoctorService {
    store: Arc<dyn RecordStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Doctor>, ApiError> {
        Ok(self.store.list_doctors().await?)
    }

    pub async fn create(&self, body: &Value) -> Result<Doctor, ApiError> {
        let fields = read_doctor_fields(body, None)?;
        let doctor = self.store.create_doctor(fields).await?;
        tracing::info!("Created doctor {}", doctor.id);
        Ok(doctor)
    }

    pub async fn retrieve(&self, id: i64) -> Result<Doctor, ApiError> {
        self.store
            .doctor_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Doctor {} not found", id)))
    }

    pub async fn update(&self, id: i64, body: &Value, partial: bool) -> Result<Doctor, ApiError> {
        let existing = self.retrieve(id).await?;
        let fields = read_doctor_fields(body, partial.then_some(&existing))?;

        self.store
            .update_doctor(id, fields)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Doctor {} not found", id)))
    }

    /// Removing a doctor also removes every mapping that references it
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.store.delete_doctor(id).await? {
            return Err(ApiError::not_found(format!("Doctor {} not found", id)));
        }
        tracing::info!("Deleted doctor {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn crud_round() {
        let doctors = DoctorService::new(Arc::new(MemoryStore::new()));
        let created = doctors
            .create(&json!({ "name": "Dr. X", "specialization": "Cardio", "email": "x@Y.com" }))
            .await
            .unwrap();
        assert_eq!(created.email, "x@y.com");

        let patched = doctors
            .update(created.id, &json!({ "specialization": "Neurology" }), true)
            .await
            .unwrap();
        assert_eq!(patched.specialization, "Neurology");
        assert_eq!(patched.name, "Dr. X");

        doctors.delete(created.id).await.unwrap();
        assert!(matches!(doctors.retrieve(created.id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(doctors.delete(created.id).await, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn rejects_bad_email_and_blank_fields() {
        let err = read_doctor_fields(&json!({ "name": " ", "specialization": "ENT", "email": "not-an-email" }), None)
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["email"], "Enter a valid email address.");
        assert_eq!(fields["name"], "This field may not be blank.");
        assert!(!fields.contains_key("specialization"));
    }
}
