use serde_json::Value;
use std::sync::Arc;

use crate::api::Payload;
use crate::auth::AuthUser;
use crate::database::models::{NewMapping, PatientDoctorMapping};
use crate::database::{DatabaseError, RecordStore};
use crate::error::ApiError;

/// Patient/doctor assignments. A mapping is visible when its patient is.
pub struct MappingService {
    store: Arc<dyn RecordStore>,
}

impl MappingService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, caller: &AuthUser) -> Result<Vec<PatientDoctorMapping>, ApiError> {
        let scope = if caller.is_staff { None } else { Some(caller.user_id) };
        Ok(self.store.list_mappings(scope).await?)
    }

    /// Both ends must exist when the mapping is created
    pub async fn create(&self, caller: &AuthUser, body: &Value) -> Result<PatientDoctorMapping, ApiError> {
        let mut payload = Payload::new(body)?;
        let patient = payload.integer("patient", None);
        let doctor = payload.integer("doctor", None);

        if !payload.has_error("patient") {
            let visible = self
                .store
                .patient_by_id(patient)
                .await?
                .is_some_and(|p| caller.is_staff || p.user == caller.user_id);
            payload.check("patient", visible, format!("Invalid pk \"{}\" - object does not exist.", patient));
        }
        if !payload.has_error("doctor") {
            let exists = self.store.doctor_by_id(doctor).await?.is_some();
            payload.check("doctor", exists, format!("Invalid pk \"{}\" - object does not exist.", doctor));
        }
        payload.finish()?;

        let mapping = self
            .store
            .create_mapping(NewMapping { patient, doctor })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => ApiError::conflict("This doctor is already assigned to this patient"),
                other => other.into(),
            })?;

        tracing::info!("Mapped doctor {} to patient {}", doctor, patient);
        Ok(mapping)
    }

    pub async fn retrieve(&self, caller: &AuthUser, id: i64) -> Result<PatientDoctorMapping, ApiError> {
        if let Some(mapping) = self.store.mapping_by_id(id).await? {
            if caller.is_staff {
                return Ok(mapping);
            }
            let owned = self
                .store
                .patient_by_id(mapping.patient)
                .await?
                .is_some_and(|p| p.user == caller.user_id);
            if owned {
                return Ok(mapping);
            }
        }
        Err(ApiError::not_found(format!("Mapping {} not found", id)))
    }

    pub async fn delete(&self, caller: &AuthUser, id: i64) -> Result<(), ApiError> {
        self.retrieve(caller, id).await?;
        if !self.store.delete_mapping(id).await? {
            return Err(ApiError::not_found(format!("Mapping {} not found", id)));
        }
        Ok(())
    }
}
