//! Configuration management for Wardgate
//!
//! Everything is loaded once from the environment at process start and is
//! immutable afterwards; handlers receive it by shared reference.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Gateway configuration
    pub gateway: GatewayConfig,
    /// Service discovery configuration
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric signing key shared by every process that verifies tokens
    pub secret: String,
    pub issuer: String,
    /// Token validity window. 24 hours by default; tests may set a negative
    /// value to mint already-expired tokens.
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Literal address the `/location/**` route forwards to
    pub location_service_addr: String,
    /// Hard bound on every forwarded call
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Discovery directory endpoint; when unset, only static instances are used
    pub registry_url: Option<String>,
    /// Statically configured instances per service name (JSON in env var)
    pub static_instances: HashMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "wardgate".to_string()),
                token_ttl_secs: env::var("JWT_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .unwrap_or(86400),
            },
            gateway: GatewayConfig {
                location_service_addr: env::var("LOCATION_SERVICE_ADDR")
                    .unwrap_or_else(|_| "http://localhost:5000".to_string()),
                upstream_timeout_secs: env::var("GATEWAY_UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            discovery: DiscoveryConfig {
                registry_url: env::var("DISCOVERY_REGISTRY_URL").ok(),
                static_instances: env::var("DISCOVERY_STATIC_INSTANCES")
                    .ok()
                    .and_then(|s| serde_json::from_str(&s).ok())
                    .unwrap_or_default(),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
