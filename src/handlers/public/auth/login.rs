// handlers/public/auth/login.rs - POST /api/auth/login/ handler

use axum::extract::State;

use crate::api::JsonBody;
use crate::app::AppState;
use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/auth/login/ - Exchange `{username, password}` for `{access, refresh}`
pub async fn login_post(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<TokenPair> {
    let tokens = state.users().login(&body, &state.config.security).await?;
    Ok(ApiResponse::success(tokens))
}
