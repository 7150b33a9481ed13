//! Application state trait for dependency injection
//!
//! Handlers are generic over this trait so the same code serves the
//! production `AppState` and test states built on in-memory repositories.

use crate::config::Config;
use crate::repository::{LocationRepository, RoleRepository, UserRepository};
use crate::service::{AuthService, LocationService};
use crate::token::TokenService;

/// State that provides the identity service's collaborators
pub trait HasServices: Clone + Send + Sync + 'static {
    /// The user repository type
    type UserRepo: UserRepository;
    /// The role repository type
    type RoleRepo: RoleRepository;
    /// The location repository type
    type LocationRepo: LocationRepository;

    /// Get the application configuration
    fn config(&self) -> &Config;

    /// Get the auth service
    fn auth_service(&self) -> &AuthService<Self::UserRepo, Self::RoleRepo>;

    /// Get the location service
    fn location_service(&self) -> &LocationService<Self::LocationRepo>;

    /// Get the token service
    fn token_service(&self) -> &TokenService;
}
