// handlers/mod.rs - two security tiers
//
// Public (no auth) serves service info and token acquisition.
// Protected (JWT auth) serves the record API under /api.
pub mod protected;
pub mod public;
