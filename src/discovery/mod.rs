//! Service discovery and per-request instance selection
//!
//! The backing directory owns instance registration and health; this module
//! only queries it. Nothing is cached across requests, so topology changes
//! show up on the very next resolution.

use crate::config::DiscoveryConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One live replica of a symbolic service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInstance {
    pub address: String,
    pub healthy: bool,
}

/// Read-only view of the discovery directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// All instances currently registered under `service`, healthy or not
    async fn instances(&self, service: &str) -> Result<Vec<ServiceInstance>>;
}

/// Registry backed by a static, env-configured instance map
pub struct StaticRegistry {
    instances: HashMap<String, Vec<String>>,
}

impl StaticRegistry {
    pub fn new(instances: HashMap<String, Vec<String>>) -> Self {
        Self { instances }
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn instances(&self, service: &str) -> Result<Vec<ServiceInstance>> {
        Ok(self
            .instances
            .get(service)
            .map(|addrs| {
                addrs
                    .iter()
                    .map(|address| ServiceInstance {
                        address: address.clone(),
                        healthy: true,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Registry backed by an external discovery directory over HTTP
pub struct HttpRegistry {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRegistry {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to build registry client: {}", e))
            })?;
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl ServiceRegistry for HttpRegistry {
    async fn instances(&self, service: &str) -> Result<Vec<ServiceInstance>> {
        let url = format!("{}/instances/{}", self.base_url, service);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Discovery query failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Discovery directory returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<ServiceInstance>>()
            .await
            .map_err(|e| AppError::Upstream(format!("Bad discovery response: {}", e)))
    }
}

/// Build the registry the config asks for: the HTTP directory if an endpoint
/// is configured, the static instance map otherwise.
pub fn build_registry(config: &DiscoveryConfig) -> Result<Box<dyn ServiceRegistry>> {
    match &config.registry_url {
        Some(url) => Ok(Box::new(HttpRegistry::new(url.clone())?)),
        None => Ok(Box::new(StaticRegistry::new(
            config.static_instances.clone(),
        ))),
    }
}

/// Resolves a symbolic service name to one healthy address per request.
///
/// Selection policy: round-robin over the healthy instances, one counter per
/// service name, so repeated calls visit every healthy instance in turn.
pub struct ServiceLocator {
    registry: Box<dyn ServiceRegistry>,
    counters: Mutex<HashMap<String, usize>>,
}

impl ServiceLocator {
    pub fn new(registry: Box<dyn ServiceRegistry>) -> Self {
        Self {
            registry,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Pick one healthy instance of `service`. An instance that died since
    /// the directory last saw it still resolves here and fails at forward
    /// time instead.
    pub async fn resolve(&self, service: &str) -> Result<String> {
        let healthy: Vec<ServiceInstance> = self
            .registry
            .instances(service)
            .await?
            .into_iter()
            .filter(|i| i.healthy)
            .collect();

        if healthy.is_empty() {
            return Err(AppError::NoInstancesAvailable(service.to_string()));
        }

        let index = {
            let mut counters = self
                .counters
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let counter = counters.entry(service.to_string()).or_insert(0);
            let index = *counter % healthy.len();
            *counter = counter.wrapping_add(1);
            index
        };

        Ok(healthy[index].address.clone())
    }
}
