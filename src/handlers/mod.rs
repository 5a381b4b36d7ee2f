// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth). Protected handlers receive the
// verified `AuthUser` as a request extension and pass it to the services,
// which resolve it and run the membership guard.
pub mod dto;
pub mod protected;
pub mod public;
