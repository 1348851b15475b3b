use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A patient profile. `user` is the owning user and is always server-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub user: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-writable patient fields. The owner is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub medical_history: Option<String>,
}
