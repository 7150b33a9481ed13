//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::discovery::{build_registry, ServiceLocator};
use crate::proxy::{self, GatewayState};
use crate::repository::{LocationRepositoryImpl, RoleRepositoryImpl, UserRepositoryImpl};
use crate::routing::default_routes;
use crate::service::{AuthService, LocationService};
use crate::state::HasServices;
use crate::token::TokenService;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across identity handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService<UserRepositoryImpl, RoleRepositoryImpl>>,
    pub location_service: Arc<LocationService<LocationRepositoryImpl>>,
    pub token_service: Arc<TokenService>,
}

impl HasServices for AppState {
    type UserRepo = UserRepositoryImpl;
    type RoleRepo = RoleRepositoryImpl;
    type LocationRepo = LocationRepositoryImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn auth_service(&self) -> &AuthService<Self::UserRepo, Self::RoleRepo> {
        &self.auth_service
    }

    fn location_service(&self) -> &LocationService<Self::LocationRepo> {
        &self.location_service
    }

    fn token_service(&self) -> &TokenService {
        &self.token_service
    }
}

/// Build the identity HTTP router.
///
/// Generic over the state type so tests can plug in their own
/// `HasServices` implementation backed by in-memory repositories.
pub fn build_router<S: HasServices>(state: S) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/register", post(api::auth::register::<S>))
        .route("/auth/login", post(api::auth::login::<S>))
        .route("/auth/me", get(api::auth::me))
        .route(
            "/locations",
            get(api::location::list::<S>).post(api::location::record::<S>),
        )
        .route("/locations/latest", get(api::location::latest::<S>))
        .route(
            "/locations/{id}",
            get(api::location::get::<S>).delete(api::location::delete::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the gateway router: no local routes, every request falls
/// through to the dispatcher.
pub fn build_gateway_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .fallback(proxy::dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the identity server until shutdown.
pub async fn run_identity(config: Config) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
    let role_repo = Arc::new(RoleRepositoryImpl::new(db_pool.clone()));
    let location_repo = Arc::new(LocationRepositoryImpl::new(db_pool));

    let state = AppState {
        auth_service: Arc::new(AuthService::new(user_repo, role_repo)),
        location_service: Arc::new(LocationService::new(location_repo)),
        token_service: Arc::new(TokenService::new(config.jwt.clone())),
        config: Arc::new(config),
    };

    let http_addr = state.config.http_addr();
    let app = build_router(state);

    info!("Identity server listening on {}", http_addr);
    let listener = TcpListener::bind(&http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the gateway server until shutdown.
pub async fn run_gateway(config: Config) -> Result<()> {
    let registry = build_registry(&config.discovery)?;
    let locator = ServiceLocator::new(registry);
    let table = default_routes(&config.gateway);
    let tokens = TokenService::new(config.jwt.clone());

    let state = Arc::new(GatewayState::new(
        table,
        locator,
        tokens,
        Duration::from_secs(config.gateway.upstream_timeout_secs),
    )?);

    let http_addr = config.http_addr();
    let app = build_gateway_router(state);

    info!("Gateway listening on {}", http_addr);
    let listener = TcpListener::bind(&http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
