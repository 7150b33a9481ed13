//! Static route table for the edge dispatcher
//!
//! Routes are declared once at startup and never mutated. Matching walks the
//! declaration order and the first matching pattern wins.

use crate::config::GatewayConfig;
use serde::Deserialize;

/// Where a matched request is sent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Target {
    /// A concrete network address, forwarded to directly
    Literal(String),
    /// A logical service name, resolved through the service locator per request
    Symbolic(String),
}

/// One routing rule: several path patterns sharing a single target
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub patterns: Vec<String>,
    pub target: Target,
    /// When set, the dispatcher requires a valid bearer token before
    /// forwarding. Off by default; the baseline gateway is auth-agnostic.
    #[serde(default)]
    pub require_auth: bool,
}

impl Route {
    pub fn new(patterns: &[&str], target: Target) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            target,
            require_auth: false,
        }
    }

    pub fn with_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }
}

/// Immutable, ordered collection of routes
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// First route whose pattern set matches `path`. `None` is the normal
    /// no-route outcome, not a fault.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.patterns.iter().any(|p| pattern_matches(p, path)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Pattern match: `/prefix/**` matches the prefix and anything under it,
/// anything else is an exact match.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/**") {
        path == prefix || path.starts_with(&format!("{}/", prefix))
    } else {
        path == pattern
    }
}

/// The platform's static rule set. Symbolic targets resolve through the
/// discovery directory at dispatch time; the location service is a fixed
/// local address.
pub fn default_routes(gateway: &GatewayConfig) -> RouteTable {
    RouteTable::new(vec![
        Route::new(
            &["/users/**", "/auth/**"],
            Target::Symbolic("user-service".to_string()),
        ),
        Route::new(
            &["/location/**"],
            Target::Literal(gateway.location_service_addr.clone()),
        ),
        Route::new(
            &["/health/**"],
            Target::Symbolic("health-data-service".to_string()),
        ),
        Route::new(
            &["/notifications/**"],
            Target::Symbolic("notification-service".to_string()),
        ),
        Route::new(
            &["/hallway/**"],
            Target::Symbolic("hallway-detection-service".to_string()),
        ),
    ])
}
