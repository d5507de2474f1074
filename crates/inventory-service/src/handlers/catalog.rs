//! Location and project catalog handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use inventory_core::{Location, Project};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Create location/project request.
#[derive(Debug, Deserialize)]
pub struct CreateCatalogEntryRequest {
    /// Unique name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A catalog entry as returned by the API.
#[derive(Debug, Serialize)]
pub struct CatalogEntryResponse {
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Registration time.
    pub created_at: String,
}

impl From<&Location> for CatalogEntryResponse {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            description: location.description.clone(),
            created_at: location.created_at.to_rfc3339(),
        }
    }
}

impl From<&Project> for CatalogEntryResponse {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: project.created_at.to_rfc3339(),
        }
    }
}

/// List locations response.
#[derive(Debug, Serialize)]
pub struct ListLocationsResponse {
    /// Locations, by name.
    pub locations: Vec<CatalogEntryResponse>,
}

/// List projects response.
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    /// Projects, by name.
    pub projects: Vec<CatalogEntryResponse>,
}

/// List registered locations.
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListLocationsResponse>, ApiError> {
    let locations = state.store.list_locations()?;
    Ok(Json(ListLocationsResponse {
        locations: locations.iter().map(CatalogEntryResponse::from).collect(),
    }))
}

/// Register a location.
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateCatalogEntryRequest>,
) -> Result<(StatusCode, Json<CatalogEntryResponse>), ApiError> {
    let location = Location::new(&body.name, body.description)?;
    state.store.put_location(&location)?;

    tracing::info!(user_id = %auth.user_id, name = %location.name, "Location registered");

    Ok((StatusCode::CREATED, Json(CatalogEntryResponse::from(&location))))
}

/// List registered projects.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let projects = state.store.list_projects()?;
    Ok(Json(ListProjectsResponse {
        projects: projects.iter().map(CatalogEntryResponse::from).collect(),
    }))
}

/// Register a project.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateCatalogEntryRequest>,
) -> Result<(StatusCode, Json<CatalogEntryResponse>), ApiError> {
    let project = Project::new(&body.name, body.description)?;
    state.store.put_project(&project)?;

    tracing::info!(user_id = %auth.user_id, name = %project.name, "Project registered");

    Ok((StatusCode::CREATED, Json(CatalogEntryResponse::from(&project))))
}
