// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, health and token acquisition.

pub mod auth;
mod health;

pub use health::{health, not_found, root};
