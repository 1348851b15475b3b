use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Doctor, DoctorFields, NewMapping, NewUser, Patient, PatientDoctorMapping, PatientFields, User,
};
use crate::database::store::RecordStore;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_staff, date_joined";
const PATIENT_COLUMNS: &str = "id, user_id, name, age, gender, medical_history, created_at, updated_at";
const DOCTOR_COLUMNS: &str = "id, name, specialization, email, created_at, updated_at";
const MAPPING_COLUMNS: &str = "id, patient_id, doctor_id, created_at";

/// PostgreSQL-backed store. Every call checks a connection out of the pool
/// for the duration of a single statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into store errors the services understand
fn classify(err: sqlx::Error) -> DatabaseError {
    if let Some(db_err) = err.as_database_error() {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some("23505") => return DatabaseError::Conflict(constraint),
            Some("23503") => return DatabaseError::InvalidReference(constraint),
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, is_staff)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_staff)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(&self.pool).await?)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        // patients and their mappings go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_patients(&self, owner: Option<i64>) -> Result<Vec<Patient>, DatabaseError> {
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, Patient>(&sql).bind(owner).fetch_all(&self.pool).await?)
    }

    async fn patient_by_id(&self, id: i64) -> Result<Option<Patient>, DatabaseError> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        Ok(sqlx::query_as::<_, Patient>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_patient(&self, owner: i64, fields: PatientFields) -> Result<Patient, DatabaseError> {
        let sql = format!(
            "INSERT INTO patients (user_id, name, age, gender, medical_history)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PATIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&sql)
            .bind(owner)
            .bind(&fields.name)
            .bind(fields.age)
            .bind(&fields.gender)
            .bind(&fields.medical_history)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_patient(&self, id: i64, fields: PatientFields) -> Result<Option<Patient>, DatabaseError> {
        let sql = format!(
            "UPDATE patients
             SET name = $2, age = $3, gender = $4, medical_history = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {PATIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(fields.age)
            .bind(&fields.gender)
            .bind(&fields.medical_history)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DatabaseError> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY id");
        Ok(sqlx::query_as::<_, Doctor>(&sql).fetch_all(&self.pool).await?)
    }

    async fn doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, DatabaseError> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1");
        Ok(sqlx::query_as::<_, Doctor>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_doctor(&self, fields: DoctorFields) -> Result<Doctor, DatabaseError> {
        let sql = format!(
            "INSERT INTO doctors (name, specialization, email)
             VALUES ($1, $2, $3)
             RETURNING {DOCTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Doctor>(&sql)
            .bind(&fields.name)
            .bind(&fields.specialization)
            .bind(&fields.email)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_doctor(&self, id: i64, fields: DoctorFields) -> Result<Option<Doctor>, DatabaseError> {
        let sql = format!(
            "UPDATE doctors
             SET name = $2, specialization = $3, email = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {DOCTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Doctor>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.specialization)
            .bind(&fields.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_doctor(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_mappings(&self, owner: Option<i64>) -> Result<Vec<PatientDoctorMapping>, DatabaseError> {
        let sql = "SELECT m.id, m.patient_id, m.doctor_id, m.created_at
             FROM patient_doctor_mappings m
             JOIN patients p ON p.id = m.patient_id
             WHERE ($1::BIGINT IS NULL OR p.user_id = $1)
             ORDER BY m.id";
        Ok(sqlx::query_as::<_, PatientDoctorMapping>(sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mapping_by_id(&self, id: i64) -> Result<Option<PatientDoctorMapping>, DatabaseError> {
        let sql = format!("SELECT {MAPPING_COLUMNS} FROM patient_doctor_mappings WHERE id = $1");
        Ok(sqlx::query_as::<_, PatientDoctorMapping>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_mapping(&self, mapping: NewMapping) -> Result<PatientDoctorMapping, DatabaseError> {
        let sql = format!(
            "INSERT INTO patient_doctor_mappings (patient_id, doctor_id)
             VALUES ($1, $2)
             RETURNING {MAPPING_COLUMNS}"
        );
        sqlx::query_as::<_, PatientDoctorMapping>(&sql)
            .bind(mapping.patient)
            .bind(mapping.doctor)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_mapping(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM patient_doctor_mappings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn doctors_for_patient(&self, patient: i64) -> Result<Vec<Doctor>, DatabaseError> {
        let sql = "SELECT d.id, d.name, d.specialization, d.email, d.created_at, d.updated_at
             FROM doctors d
             JOIN patient_doctor_mappings m ON m.doctor_id = d.id
             WHERE m.patient_id = $1
             ORDER BY m.id";
        Ok(sqlx::query_as::<_, Doctor>(sql).bind(patient).fetch_all(&self.pool).await?)
    }
}
