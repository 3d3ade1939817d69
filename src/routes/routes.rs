//! Defines routes for the travel bucket-list API.
//!
//! ## Structure
//! - **Destinations** (read-only catalog)
//!   - `GET    /api/destinations` — search, filter, paginate
//!   - `GET    /api/destinations/countries` — distinct country names
//!   - `GET    /api/destinations/{id}` — one destination
//!
//! - **Bucket list**
//!   - `GET    /api/bucketlist` — list entries
//!   - `POST   /api/bucketlist` — add a destination
//!   - `PATCH  /api/bucketlist/{id}` — partial update
//!   - `DELETE /api/bucketlist/{id}` — remove entry
//!   - `GET    /api/bucketlist/map` — map markers
//!
//! - **Health**: `GET /api/health`, `GET /api/ready`

use crate::{
    handlers::{
        bucketlist_handlers::{
            add_to_bucketlist, get_map_markers, list_bucketlist, remove_from_bucketlist,
            update_bucketlist_item,
        },
        destination_handlers::{get_destination, list_countries, list_destinations},
        health_handlers::{health, ready},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the API router without state attached.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ready", get(ready))
        .route("/api/destinations", get(list_destinations))
        .route("/api/destinations/countries", get(list_countries))
        .route("/api/destinations/{id}", get(get_destination))
        .route(
            "/api/bucketlist",
            get(list_bucketlist).post(add_to_bucketlist),
        )
        .route("/api/bucketlist/map", get(get_map_markers))
        .route(
            "/api/bucketlist/{id}",
            patch(update_bucketlist_item).delete(remove_from_bucketlist),
        )
}

/// The complete application: routes, shared state, tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
