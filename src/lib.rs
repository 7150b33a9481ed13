//! Wardgate - edge gateway and identity service
//!
//! This crate bundles two servers behind one binary: an identity
//! service issuing signed role-bearing tokens, and a gateway that
//! routes and forwards requests to backing services.

pub mod api;
pub mod config;
pub mod crypto;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod proxy;
pub mod repository;
pub mod routing;
pub mod server;
pub mod service;
pub mod state;
pub mod token;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
