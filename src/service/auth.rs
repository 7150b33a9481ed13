//! Registration and credential verification

use crate::crypto;
use crate::domain::{CreateUserInput, LoginInput, RegisterInput, Role, UserWithRoles};
use crate::error::{AppError, Result};
use crate::repository::{RoleRepository, UserRepository};
use std::sync::Arc;
use validator::Validate;

pub struct AuthService<U: UserRepository, R: RoleRepository> {
    user_repo: Arc<U>,
    role_repo: Arc<R>,
}

impl<U: UserRepository, R: RoleRepository> AuthService<U, R> {
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>) -> Self {
        Self {
            user_repo,
            role_repo,
        }
    }

    /// Register a new principal. Role names are upserted by exact name:
    /// an existing record is reused, a new one is created otherwise, so the
    /// same name never yields two Role records.
    pub async fn register(&self, input: RegisterInput) -> Result<UserWithRoles> {
        input.validate()?;

        if input.roles.iter().any(|name| name.is_empty()) {
            return Err(AppError::BadRequest(
                "Role name cannot be empty".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        // Resolve the full role set before touching the users table, so a
        // failed upsert never leaves a principal stored with zero roles.
        let mut roles = Vec::new();
        for name in &input.roles {
            let role = match self.role_repo.find_by_name(name).await? {
                Some(existing) => existing,
                None => self.role_repo.create(name).await?,
            };
            if !roles.iter().any(|r: &Role| r.id == role.id) {
                roles.push(role);
            }
        }

        let password_hash = crypto::hash_password(&input.password)?;
        let user = self
            .user_repo
            .create(&CreateUserInput {
                username: input.username.clone(),
                password_hash,
            })
            .await?;

        let mut role_names = Vec::new();
        for role in &roles {
            self.user_repo.assign_role(user.id, role.id).await?;
            role_names.push(role.name.clone());
        }

        tracing::info!(username = %user.username, "Registered new user");

        Ok(UserWithRoles {
            user,
            roles: role_names,
        })
    }

    /// Check a presented secret against the stored hash and return the
    /// principal with its current role set.
    pub async fn authenticate(&self, input: LoginInput) -> Result<UserWithRoles> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !crypto::verify_password(&input.password, &user.password_hash)? {
            // Opaque on purpose: does not say which check failed
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let roles = self
            .user_repo
            .find_roles(user.id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        Ok(UserWithRoles { user, roles })
    }
}
