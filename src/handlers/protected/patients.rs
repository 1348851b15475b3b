// handlers/protected/patients.rs - /api/patients/ endpoints

use axum::{extract::State, Extension};

use crate::api::{JsonBody, RecordId};
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::{Doctor, Patient};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/patients/
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<AuthUser>) -> ApiResult<Vec<Patient>> {
    Ok(ApiResponse::success(state.patients().list(&caller).await?))
}

/// POST /api/patients/ - The new patient is owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> ApiResult<Patient> {
    Ok(ApiResponse::created(state.patients().create(&caller, &body).await?))
}

/// GET /api/patients/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Patient> {
    Ok(ApiResponse::success(state.patients().retrieve(&caller, id).await?))
}

/// PUT /api/patients/:id/
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<Patient> {
    Ok(ApiResponse::success(state.patients().update(&caller, id, &body, false).await?))
}

/// PATCH /api/patients/:id/
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<Patient> {
    Ok(ApiResponse::success(state.patients().update(&caller, id, &body, true).await?))
}

/// DELETE /api/patients/:id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<()> {
    state.patients().delete(&caller, id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/patients/:id/doctors/
pub async fn doctors(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Vec<Doctor>> {
    Ok(ApiResponse::success(state.patients().doctors(&caller, id).await?))
}
