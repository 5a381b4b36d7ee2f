// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`. Family-scoped routes
// additionally pass the membership guard inside the services.

pub mod bill;
pub mod family;
pub mod user;
