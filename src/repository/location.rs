//! Location repository

use crate::domain::{CreateLocationInput, Location};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn save(&self, input: &CreateLocationInput) -> Result<Location>;
    async fn find_all(&self) -> Result<Vec<Location>>;
    /// Most recently recorded location across all users
    async fn find_latest(&self) -> Result<Option<Location>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct LocationRepositoryImpl {
    pool: MySqlPool,
}

impl LocationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for LocationRepositoryImpl {
    async fn save(&self, input: &CreateLocationInput) -> Result<Location> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO locations (id, room_id, username, recorded_at)
            VALUES (?, ?, ?, NOW())
            "#,
        )
        .bind(id)
        .bind(&input.room_id)
        .bind(&input.username)
        .execute(&self.pool)
        .await?;

        let location = self.find_by_id(id).await?;
        location.ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to save location")))
    }

    async fn find_all(&self) -> Result<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, room_id, username, recorded_at
            FROM locations
            ORDER BY recorded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn find_latest(&self) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, room_id, username, recorded_at
            FROM locations
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, room_id, username, recorded_at
            FROM locations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {} not found", id)));
        }

        Ok(())
    }
}
