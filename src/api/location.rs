//! Location tracking handlers

use crate::api::MessageResponse;
use crate::domain::{CreateLocationInput, Location};
use crate::error::Result;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

/// Record a location observation
pub async fn record<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<CreateLocationInput>,
) -> Result<Json<Location>> {
    let location = state.location_service().record(input).await?;
    Ok(Json(location))
}

/// List every recorded location
pub async fn list<S: HasServices>(State(state): State<S>) -> Result<Json<Vec<Location>>> {
    let locations = state.location_service().list().await?;
    Ok(Json(locations))
}

/// Most recent observation by timestamp
pub async fn latest<S: HasServices>(State(state): State<S>) -> Result<Json<Location>> {
    let location = state.location_service().latest().await?;
    Ok(Json(location))
}

/// Fetch one observation by id
pub async fn get<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<Json<Location>> {
    let location = state.location_service().get(id).await?;
    Ok(Json(location))
}

/// Delete one observation by id
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.location_service().delete(id).await?;
    Ok(Json(MessageResponse::new("deleted")))
}
