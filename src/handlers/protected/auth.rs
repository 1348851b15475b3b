// handlers/protected/auth.rs - account endpoints for the authenticated caller

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::UserInfo;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/whoami/ - The caller's public profile
pub async fn whoami(State(state): State<AppState>, Extension(caller): Extension<AuthUser>) -> ApiResult<UserInfo> {
    let user = state.users().whoami(&caller).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/auth/user/ - Delete the caller's account with its patient and mappings
pub async fn delete_account(State(state): State<AppState>, Extension(caller): Extension<AuthUser>) -> ApiResult<()> {
    state.users().delete_account(&caller).await?;
    Ok(ApiResponse::no_content())
}
