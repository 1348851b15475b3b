// handlers/public/auth/refresh.rs - POST /api/auth/token/refresh/ handler

use axum::extract::State;

use crate::api::JsonBody;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AccessToken;

/// POST /api/auth/token/refresh/ - Exchange `{refresh}` for a new `{access}`
pub async fn refresh_post(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<AccessToken> {
    let access = state.users().refresh(&body, &state.config.security).await?;
    Ok(ApiResponse::success(access))
}
