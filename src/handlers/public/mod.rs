// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness probes and token acquisition.

pub mod auth;
pub mod health;
