//! Common test utilities: an in-memory identity server

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;
use wardgate::config::{Config, DatabaseConfig, DiscoveryConfig, GatewayConfig, JwtConfig};
use wardgate::domain::{CreateLocationInput, CreateUserInput, Location, Role, User};
use wardgate::error::{AppError, Result};
use wardgate::repository::{LocationRepository, RoleRepository, UserRepository};
use wardgate::server::build_router;
use wardgate::service::{AuthService, LocationService};
use wardgate::state::HasServices;
use wardgate::token::TokenService;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-integration-tests";

pub fn test_config() -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        database: DatabaseConfig {
            url: "mysql://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: "wardgate-test".to_string(),
            token_ttl_secs: 3600,
        },
        gateway: GatewayConfig {
            location_service_addr: "http://localhost:5000".to_string(),
            upstream_timeout_secs: 5,
        },
        discovery: DiscoveryConfig {
            registry_url: None,
            static_instances: HashMap::new(),
        },
    }
}

/// User store backed by a mutex-guarded map
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    roles: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    role_catalog: Arc<InMemoryRoleRepository>,
}

impl InMemoryUserRepository {
    pub fn new(role_catalog: Arc<InMemoryRoleRepository>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            roles: Mutex::new(HashMap::new()),
            role_catalog,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<()> {
        let mut roles = self.roles.lock().unwrap();
        let assigned = roles.entry(user_id).or_default();
        if !assigned.contains(&role_id) {
            assigned.push(role_id);
        }
        Ok(())
    }

    async fn find_roles(&self, user_id: Uuid) -> Result<Vec<Role>> {
        let assigned = self
            .roles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        let catalog = self.role_catalog.entries.lock().unwrap();
        Ok(catalog
            .iter()
            .filter(|r| assigned.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRoleRepository {
    entries: Mutex<Vec<Role>>,
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn create(&self, name: &str) -> Result<Role> {
        let role = Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.entries.lock().unwrap().push(role.clone());
        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryLocationRepository {
    entries: Mutex<Vec<Location>>,
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn save(&self, input: &CreateLocationInput) -> Result<Location> {
        let location = Location {
            id: Uuid::new_v4(),
            room_id: input.room_id.clone(),
            username: input.username.clone(),
            recorded_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(location.clone());
        Ok(location)
    }

    async fn find_all(&self) -> Result<Vec<Location>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn find_latest(&self) -> Result<Option<Location>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|l| l.recorded_at)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|l| l.id != id);
        if entries.len() == before {
            return Err(AppError::NotFound("Location not found".to_string()));
        }
        Ok(())
    }
}

/// Identity server state wired to in-memory repositories
#[derive(Clone)]
pub struct TestState {
    config: Arc<Config>,
    auth_service: Arc<AuthService<InMemoryUserRepository, InMemoryRoleRepository>>,
    location_service: Arc<LocationService<InMemoryLocationRepository>>,
    token_service: Arc<TokenService>,
}

impl TestState {
    pub fn new(config: Config) -> Self {
        let role_repo = Arc::new(InMemoryRoleRepository::default());
        let user_repo = Arc::new(InMemoryUserRepository::new(role_repo.clone()));
        let location_repo = Arc::new(InMemoryLocationRepository::default());

        Self {
            auth_service: Arc::new(AuthService::new(user_repo, role_repo)),
            location_service: Arc::new(LocationService::new(location_repo)),
            token_service: Arc::new(TokenService::new(config.jwt.clone())),
            config: Arc::new(config),
        }
    }
}

impl HasServices for TestState {
    type UserRepo = InMemoryUserRepository;
    type RoleRepo = InMemoryRoleRepository;
    type LocationRepo = InMemoryLocationRepository;

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

/// A running identity server bound to an ephemeral port
pub struct TestApp {
    pub addr: String,
    pub state: TestState,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        let state = TestState::new(config);
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        Self { addr, state }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }
}
