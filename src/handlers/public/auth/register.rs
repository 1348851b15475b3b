// handlers/public/auth/register.rs - POST /api/auth/register/ handler

use axum::extract::State;

use crate::api::JsonBody;
use crate::app::AppState;
use crate::database::models::UserInfo;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/auth/register/ - Create a regular user account
///
/// Expected input:
/// ```json
/// { "username": "alice", "email": "a@x.com", "password": "Str0ng!Pass" }
/// ```
///
/// Responds 201 with `{id, username, email}`. The password is never echoed.
pub async fn register_post(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<UserInfo> {
    let user = state.users().register(&body, &state.config.password).await?;
    Ok(ApiResponse::created(user))
}
