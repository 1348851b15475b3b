use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Assignment of one doctor to one patient. Lives only as long as both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PatientDoctorMapping {
    pub id: i64,
    #[sqlx(rename = "patient_id")]
    pub patient: i64,
    #[sqlx(rename = "doctor_id")]
    pub doctor: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMapping {
    pub patient: i64,
    pub doctor: i64,
}
