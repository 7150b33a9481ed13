//! HTTP middleware for the identity service

pub mod auth;

pub use auth::AuthUser;
