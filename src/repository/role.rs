//! Role repository
//!
//! Role identity is the exact name string. Lookups never normalize case.

use crate::domain::Role;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Role>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
}

pub struct RoleRepositoryImpl {
    pool: MySqlPool,
}

impl RoleRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for RoleRepositoryImpl {
    async fn create(&self, name: &str) -> Result<Role> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO roles (id, name)
            VALUES (?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name
            FROM roles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        role.ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create role")))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name
            FROM roles
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }
}
