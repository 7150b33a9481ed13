//! Business logic services

pub mod auth;
pub mod location;

pub use auth::AuthService;
pub use location::LocationService;
