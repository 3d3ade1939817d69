//! Shared application state handed to every handler.

use crate::services::{
    bucketlist_service::BucketListService, destination_service::DestinationService,
};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub destinations: DestinationService,
    pub bucketlist: BucketListService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            destinations: DestinationService::new(db.clone()),
            bucketlist: BucketListService::new(db.clone()),
            db,
        }
    }
}

impl FromRef<AppState> for DestinationService {
    fn from_ref(state: &AppState) -> Self {
        state.destinations.clone()
    }
}

impl FromRef<AppState> for BucketListService {
    fn from_ref(state: &AppState) -> Self {
        state.bucketlist.clone()
    }
}
