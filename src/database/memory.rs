use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Doctor, DoctorFields, NewMapping, NewUser, Patient, PatientDoctorMapping, PatientFields, User,
};
use crate::database::store::RecordStore;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    patients: BTreeMap<i64, Patient>,
    doctors: BTreeMap<i64, Doctor>,
    mappings: BTreeMap<i64, PatientDoctorMapping>,
    next_user: i64,
    next_patient: i64,
    next_doctor: i64,
    next_mapping: i64,
}

impl Tables {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn remove_patient(&mut self, id: i64) -> bool {
        let removed = self.patients.remove(&id).is_some();
        if removed {
            self.mappings.retain(|_, m| m.patient != id);
        }
        removed
    }
}

/// Process-local store with the same cascade and uniqueness rules as the
/// PostgreSQL schema. Writes hold the table lock for the whole operation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict("users_username_key".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }

        let id = Tables::next(&mut tables.next_user);
        let record = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            date_joined: Utc::now(),
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = tables
            .patients
            .values()
            .filter(|p| p.user == id)
            .map(|p| p.id)
            .collect();
        for patient in owned {
            tables.remove_patient(patient);
        }
        Ok(true)
    }

    async fn list_patients(&self, owner: Option<i64>) -> Result<Vec<Patient>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .filter(|p| owner.map_or(true, |user| p.user == user))
            .cloned()
            .collect())
    }

    async fn patient_by_id(&self, id: i64) -> Result<Option<Patient>, DatabaseError> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn create_patient(&self, owner: i64, fields: PatientFields) -> Result<Patient, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner) {
            return Err(DatabaseError::InvalidReference("patients_user_id_fkey".to_string()));
        }
        if tables.patients.values().any(|p| p.user == owner) {
            return Err(DatabaseError::Conflict("patients_user_id_key".to_string()));
        }

        let id = Tables::next(&mut tables.next_patient);
        let now = Utc::now();
        let record = Patient {
            id,
            user: owner,
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            medical_history: fields.medical_history,
            created_at: now,
            updated_at: now,
        };
        tables.patients.insert(id, record.clone());
        Ok(record)
    }

    async fn update_patient(&self, id: i64, fields: PatientFields) -> Result<Option<Patient>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.patients.get_mut(&id).map(|patient| {
            patient.name = fields.name;
            patient.age = fields.age;
            patient.gender = fields.gender;
            patient.medical_history = fields.medical_history;
            patient.updated_at = Utc::now();
            patient.clone()
        }))
    }

    async fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.remove_patient(id))
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DatabaseError> {
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, DatabaseError> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn create_doctor(&self, fields: DoctorFields) -> Result<Doctor, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = Tables::next(&mut tables.next_doctor);
        let now = Utc::now();
        let record = Doctor {
            id,
            name: fields.name,
            specialization: fields.specialization,
            email: fields.email,
            created_at: now,
            updated_at: now,
        };
        tables.doctors.insert(id, record.clone());
        Ok(record)
    }

    async fn update_doctor(&self, id: i64, fields: DoctorFields) -> Result<Option<Doctor>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.doctors.get_mut(&id).map(|doctor| {
            doctor.name = fields.name;
            doctor.specialization = fields.specialization;
            doctor.email = fields.email;
            doctor.updated_at = Utc::now();
            doctor.clone()
        }))
    }

    async fn delete_doctor(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let removed = tables.doctors.remove(&id).is_some();
        if removed {
            tables.mappings.retain(|_, m| m.doctor != id);
        }
        Ok(removed)
    }

    async fn list_mappings(&self, owner: Option<i64>) -> Result<Vec<PatientDoctorMapping>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .mappings
            .values()
            .filter(|m| match owner {
                None => true,
                Some(user) => tables.patients.get(&m.patient).is_some_and(|p| p.user == user),
            })
            .cloned()
            .collect())
    }

    async fn mapping_by_id(&self, id: i64) -> Result<Option<PatientDoctorMapping>, DatabaseError> {
        Ok(self.tables.read().await.mappings.get(&id).cloned())
    }

    async fn create_mapping(&self, mapping: NewMapping) -> Result<PatientDoctorMapping, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.patients.contains_key(&mapping.patient) {
            return Err(DatabaseError::InvalidReference("patient_doctor_mappings_patient_id_fkey".to_string()));
        }
        if !tables.doctors.contains_key(&mapping.doctor) {
            return Err(DatabaseError::InvalidReference("patient_doctor_mappings_doctor_id_fkey".to_string()));
        }
        if tables
            .mappings
            .values()
            .any(|m| m.patient == mapping.patient && m.doctor == mapping.doctor)
        {
            return Err(DatabaseError::Conflict("patient_doctor_mappings_pair_key".to_string()));
        }

        let id = Tables::next(&mut tables.next_mapping);
        let record = PatientDoctorMapping {
            id,
            patient: mapping.patient,
            doctor: mapping.doctor,
            created_at: Utc::now(),
        };
        tables.mappings.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_mapping(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.mappings.remove(&id).is_some())
    }

    async fn doctors_for_patient(&self, patient: i64) -> Result<Vec<Doctor>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .mappings
            .values()
            .filter(|m| m.patient == patient)
            .filter_map(|m| tables.doctors.get(&m.doctor).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
            is_staff: false,
        }
    }

    fn patient_fields(name: &str) -> PatientFields {
        PatientFields {
            name: name.to_string(),
            age: 40,
            gender: "F".to_string(),
            medical_history: None,
        }
    }

    fn doctor_fields(name: &str) -> DoctorFields {
        DoctorFields {
            name: name.to_string(),
            specialization: "Cardiology".to_string(),
            email: format!("{}@clinic.org", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_patient_and_mappings() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("carol")).await.unwrap();
        let patient = store.create_patient(user.id, patient_fields("Carol")).await.unwrap();

        let mut mapping_ids = Vec::new();
        for name in ["House", "Grey", "Watson"] {
            let doctor = store.create_doctor(doctor_fields(name)).await.unwrap();
            let mapping = store
                .create_mapping(NewMapping { patient: patient.id, doctor: doctor.id })
                .await
                .unwrap();
            mapping_ids.push(mapping.id);
        }

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.patient_by_id(patient.id).await.unwrap().is_none());
        for id in mapping_ids {
            assert!(store.mapping_by_id(id).await.unwrap().is_none());
        }
        // doctors are independent of patients
        assert_eq!(store.list_doctors().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn deleting_doctor_only_removes_its_mappings() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("dave")).await.unwrap();
        let patient = store.create_patient(user.id, patient_fields("Dave")).await.unwrap();
        let kept = store.create_doctor(doctor_fields("Kept")).await.unwrap();
        let gone = store.create_doctor(doctor_fields("Gone")).await.unwrap();

        let keep = store
            .create_mapping(NewMapping { patient: patient.id, doctor: kept.id })
            .await
            .unwrap();
        let removed = store
            .create_mapping(NewMapping { patient: patient.id, doctor: gone.id })
            .await
            .unwrap();

        assert!(store.delete_doctor(gone.id).await.unwrap());
        assert!(store.mapping_by_id(removed.id).await.unwrap().is_none());
        assert_eq!(store.mapping_by_id(keep.id).await.unwrap(), Some(keep));
    }

    #[tokio::test]
    async fn uniqueness_and_references_are_enforced() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("erin")).await.unwrap();
        assert!(matches!(
            store.create_user(new_user("erin")).await,
            Err(DatabaseError::Conflict(_))
        ));

        let patient = store.create_patient(user.id, patient_fields("Erin")).await.unwrap();
        assert!(matches!(
            store.create_patient(user.id, patient_fields("Erin again")).await,
            Err(DatabaseError::Conflict(_))
        ));
        assert!(matches!(
            store.create_patient(999, patient_fields("Nobody")).await,
            Err(DatabaseError::InvalidReference(_))
        ));

        let doctor = store.create_doctor(doctor_fields("Strange")).await.unwrap();
        let pair = NewMapping { patient: patient.id, doctor: doctor.id };
        store.create_mapping(pair).await.unwrap();
        assert!(matches!(store.create_mapping(pair).await, Err(DatabaseError::Conflict(_))));
        assert!(matches!(
            store.create_mapping(NewMapping { patient: patient.id, doctor: 42 }).await,
            Err(DatabaseError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn mappings_can_be_scoped_to_an_owner() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("frank")).await.unwrap();
        let b = store.create_user(new_user("gina")).await.unwrap();
        let pa = store.create_patient(a.id, patient_fields("Frank")).await.unwrap();
        let pb = store.create_patient(b.id, patient_fields("Gina")).await.unwrap();
        let doctor = store.create_doctor(doctor_fields("Who")).await.unwrap();
        store.create_mapping(NewMapping { patient: pa.id, doctor: doctor.id }).await.unwrap();
        store.create_mapping(NewMapping { patient: pb.id, doctor: doctor.id }).await.unwrap();

        assert_eq!(store.list_mappings(None).await.unwrap().len(), 2);
        let own = store.list_mappings(Some(a.id)).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].patient, pa.id);
        assert_eq!(store.doctors_for_patient(pb.id).await.unwrap(), vec![doctor]);
    }
}
