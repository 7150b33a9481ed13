//! Location tracking business logic

use crate::domain::{CreateLocationInput, Location};
use crate::error::{AppError, Result};
use crate::repository::LocationRepository;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct LocationService<L: LocationRepository> {
    repo: Arc<L>,
}

impl<L: LocationRepository> LocationService<L> {
    pub fn new(repo: Arc<L>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, input: CreateLocationInput) -> Result<Location> {
        input.validate()?;
        self.repo.save(&input).await
    }

    pub async fn list(&self) -> Result<Vec<Location>> {
        self.repo.find_all().await
    }

    /// Latest-by-timestamp retrieval
    pub async fn latest(&self) -> Result<Location> {
        self.repo
            .find_latest()
            .await?
            .ok_or_else(|| AppError::NotFound("No locations recorded".to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Location> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }
}
