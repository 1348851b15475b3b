// handlers/protected/mappings.rs - /api/mappings/ endpoints

use axum::{extract::State, Extension};

use crate::api::{JsonBody, RecordId};
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::PatientDoctorMapping;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/mappings/ - Mappings whose patient the caller can see
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<PatientDoctorMapping>> {
    Ok(ApiResponse::success(state.mappings().list(&caller).await?))
}

/// POST /api/mappings/ - `{patient, doctor}`
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> ApiResult<PatientDoctorMapping> {
    Ok(ApiResponse::created(state.mappings().create(&caller, &body).await?))
}

/// GET /api/mappings/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<PatientDoctorMapping> {
    Ok(ApiResponse::success(state.mappings().retrieve(&caller, id).await?))
}

/// DELETE /api/mappings/:id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<()> {
    state.mappings().delete(&caller, id).await?;
    Ok(ApiResponse::no_content())
}
