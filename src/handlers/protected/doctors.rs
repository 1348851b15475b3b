// handlers/protected/doctors.rs - /api/doctors/ endpoints
//
// Doctors are shared; authentication is the only gate.

use axum::{extract::State, Extension};

use crate::api::{JsonBody, RecordId};
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::Doctor;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Doctor>> {
    Ok(ApiResponse::success(state.doctors().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> ApiResult<Doctor> {
    let doctor = state.doctors().create(&body).await?;
    tracing::debug!("Doctor {} created by '{}'", doctor.id, caller.username);
    Ok(ApiResponse::created(doctor))
}

pub async fn retrieve(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Doctor> {
    Ok(ApiResponse::success(state.doctors().retrieve(id).await?))
}

pub async fn update(State(state): State<AppState>, RecordId(id): RecordId, JsonBody(body): JsonBody) -> ApiResult<Doctor> {
    Ok(ApiResponse::success(state.doctors().update(id, &body, false).await?))
}

pub async fn partial_update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<Doctor> {
    Ok(ApiResponse::success(state.doctors().update(id, &body, true).await?))
}

pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<()> {
    state.doctors().delete(id).await?;
    Ok(ApiResponse::no_content())
}
