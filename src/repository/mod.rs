//! Data access layer (Repository pattern)

pub mod location;
pub mod role;
pub mod user;

pub use location::{LocationRepository, LocationRepositoryImpl};
pub use role::{RoleRepository, RoleRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};
