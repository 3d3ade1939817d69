//! HTTP handlers for the read-only destination catalog.

use crate::{
    errors::AppError,
    models::destination::DestinationRead,
    services::destination_service::{DEFAULT_PAGE_SIZE, DestinationService, ListDestinationsParams},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

/// Query params accepted by `GET /api/destinations`.
#[derive(Debug, Deserialize)]
pub struct ListDestinationsQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CountriesQuery {
    pub category: Option<String>,
}

/// GET `/api/destinations` — search and page through the catalog.
pub async fn list_destinations(
    State(service): State<DestinationService>,
    Query(q): Query<ListDestinationsQuery>,
) -> Result<Json<Vec<DestinationRead>>, AppError> {
    let params = ListDestinationsParams {
        q: q.q,
        category: q.category,
        country: q.country,
        limit: q.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: q.offset.unwrap_or(0),
    };
    let destinations = service.list(&params).await?;
    Ok(Json(destinations))
}

/// GET `/api/destinations/countries`
pub async fn list_countries(
    State(service): State<DestinationService>,
    Query(q): Query<CountriesQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let countries = service.countries(q.category.as_deref()).await?;
    Ok(Json(countries))
}

/// GET `/api/destinations/{id}`
pub async fn get_destination(
    State(service): State<DestinationService>,
    Path(id): Path<i64>,
) -> Result<Json<DestinationRead>, AppError> {
    Ok(Json(service.get(id).await?))
}
