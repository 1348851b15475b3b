// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route prefix: /api. The auth middleware injects the caller as an
// `Extension<AuthUser>`; record visibility is decided by the services.

pub mod auth;
pub mod doctors;
pub mod mappings;
pub mod patients;
