//! Edge dispatcher: route match, resolve, forward
//!
//! Transparent proxy semantics: method, headers, query and body pass through
//! verbatim in both directions. The dispatcher interprets nothing about the
//! request except its path, unless a route opts into bearer-token
//! enforcement.

use crate::discovery::ServiceLocator;
use crate::error::{AppError, Result};
use crate::routing::{RouteTable, Target};
use crate::token::TokenService;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;

/// Everything a dispatch needs; immutable after startup
pub struct GatewayState {
    pub table: RouteTable,
    pub locator: ServiceLocator,
    pub tokens: TokenService,
    client: reqwest::Client,
}

impl GatewayState {
    pub fn new(
        table: RouteTable,
        locator: ServiceLocator,
        tokens: TokenService,
        upstream_timeout: Duration,
    ) -> Result<Self> {
        // The timeout is mandatory: a hung upstream must not pin the
        // connection forever.
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to build upstream client: {}", e))
            })?;

        Ok(Self {
            table,
            locator,
            tokens,
            client,
        })
    }
}

/// Axum fallback handler: every request not served locally lands here
pub async fn dispatch(
    State(state): State<Arc<GatewayState>>,
    request: Request<Body>,
) -> Response {
    match handle(&state, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn handle(state: &GatewayState, request: Request<Body>) -> Result<Response> {
    let path = request.uri().path().to_string();

    let route = state
        .table
        .match_path(&path)
        .ok_or_else(|| AppError::NotFound(format!("No route for path '{}'", path)))?;

    if route.require_auth {
        require_bearer(state, &request)?;
    }

    let base = match &route.target {
        Target::Literal(address) => address.clone(),
        Target::Symbolic(service) => {
            let address = state.locator.resolve(service).await?;
            tracing::debug!(service = %service, address = %address, "Resolved symbolic target");
            address
        }
    };

    forward(state, &base, request).await
}

/// Reject the request unless it carries a valid bearer token
fn require_bearer(state: &GatewayState, request: &Request<Body>) -> Result<()> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    state.tokens.verify(token)?;
    Ok(())
}

/// Headers that describe a single connection, not the message. The proxy
/// terminates both connections and fully buffers the body, so relaying
/// these (transfer-encoding in particular) would mis-frame the message.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &axum::http::HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Forward the request to `base` and relay the upstream response verbatim
async fn forward(state: &GatewayState, base: &str, request: Request<Body>) -> Result<Response> {
    let path = request.uri().path();
    let target_url = match request.uri().query() {
        Some(query) => format!("{}{}?{}", base, path, query),
        None => format!("{}{}", base, path),
    };

    let method = request.method().clone();
    let headers = request.headers().clone();

    let (_parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to read request body: {}", e)))?;

    let mut upstream_request = state.client.request(method, &target_url);
    // Host is set by the client for the target; connection-level headers
    // stay on their own leg.
    for (key, value) in headers.iter() {
        if key != "host" && !is_hop_by_hop(key) {
            upstream_request = upstream_request.header(key, value);
        }
    }
    if !body_bytes.is_empty() {
        upstream_request = upstream_request.body(body_bytes.to_vec());
    }

    let upstream_response = upstream_request
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Forwarding to {} failed: {}", target_url, e)))?;

    let status = upstream_response.status();
    let mut response = Response::builder().status(status);
    for (key, value) in upstream_response.headers().iter() {
        if !is_hop_by_hop(key) {
            response = response.header(key, value);
        }
    }

    let response_bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to read upstream body: {}", e)))?;

    response
        .body(Body::from(response_bytes.to_vec()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
