//! HTTP handlers for bucket-list entries and map markers.

use crate::{
    errors::AppError,
    models::bucket_item::{BucketListCreate, BucketListRead, BucketListUpdate, MapMarker},
    services::bucketlist_service::{BucketListService, ListEntriesParams},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Query params accepted by `GET /api/bucketlist`.
#[derive(Debug, Deserialize)]
pub struct ListBucketListQuery {
    pub visited: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(default)]
    pub visited_only: bool,
}

/// GET `/api/bucketlist` — entries joined with their destinations, newest first.
pub async fn list_bucketlist(
    State(service): State<BucketListService>,
    Query(q): Query<ListBucketListQuery>,
) -> Result<Json<Vec<BucketListRead>>, AppError> {
    let params = ListEntriesParams {
        visited: q.visited,
        category: q.category,
    };
    Ok(Json(service.list(&params).await?))
}

/// POST `/api/bucketlist` — 201 on success, 404 for unknown destinations,
/// 409 when the destination is already listed.
pub async fn add_to_bucketlist(
    State(service): State<BucketListService>,
    Json(payload): Json<BucketListCreate>,
) -> Result<impl IntoResponse, AppError> {
    let entry = service.add(payload.destination_id, payload.notes).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH `/api/bucketlist/{id}`
pub async fn update_bucketlist_item(
    State(service): State<BucketListService>,
    Path(id): Path<i64>,
    Json(patch): Json<BucketListUpdate>,
) -> Result<Json<BucketListRead>, AppError> {
    Ok(Json(service.update(id, &patch).await?))
}

/// DELETE `/api/bucketlist/{id}`
pub async fn remove_from_bucketlist(
    State(service): State<BucketListService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/api/bucketlist/map` — pins for the world map.
pub async fn get_map_markers(
    State(service): State<BucketListService>,
    Query(q): Query<MapQuery>,
) -> Result<Json<Vec<MapMarker>>, AppError> {
    Ok(Json(service.map_markers(q.visited_only).await?))
}
