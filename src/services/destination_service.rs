//! DestinationService — read-only queries over the destination catalog.
//!
//! Every destination returned here is annotated with its bucket-list
//! membership. Pages are annotated with one batched lookup, never one query
//! per row.

use crate::models::destination::{Destination, DestinationRead};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 200;

const DESTINATION_COLUMNS: &str = "id, name, category, country, country_code, region, \
     latitude, longitude, population, description, image_url";

#[derive(Clone, Debug, Default)]
pub struct ListDestinationsParams {
    /// Case-insensitive substring of the name.
    pub q: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("destination `{0}` not found")]
    DestinationNotFound(i64),
    #[error("limit {0} exceeds the maximum of {MAX_PAGE_SIZE}")]
    LimitTooLarge(u32),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Clone)]
pub struct DestinationService {
    pub db: Arc<SqlitePool>,
}

impl DestinationService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Search, filter and page through destinations.
    ///
    /// Ordered by population (largest first, unknown last), then by name.
    pub async fn list(&self, params: &ListDestinationsParams) -> CatalogResult<Vec<DestinationRead>> {
        if params.limit > MAX_PAGE_SIZE {
            return Err(CatalogError::LimitTooLarge(params.limit));
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE 1 = 1"
        ));

        if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
            builder.push(" AND name LIKE ");
            builder.push_bind(format!("%{}%", escape_like(q)));
            builder.push(" ESCAPE '\\'");
        }
        if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
            builder.push(" AND category = ");
            builder.push_bind(category.to_string());
        }
        if let Some(country) = params.country.as_deref().filter(|c| !c.is_empty()) {
            builder.push(" AND country = ");
            builder.push_bind(country.to_string());
        }

        builder.push(" ORDER BY population IS NULL, population DESC, name ASC LIMIT ");
        builder.push_bind(i64::from(params.limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(params.offset));

        let destinations: Vec<Destination> =
            builder.build_query_as().fetch_all(&*self.db).await?;

        let ids: Vec<i64> = destinations.iter().map(|d| d.id).collect();
        let memberships = self.bucket_items_for(&ids).await?;

        Ok(destinations
            .into_iter()
            .map(|d| {
                let item_id = memberships.get(&d.id).copied();
                DestinationRead::new(d, item_id)
            })
            .collect())
    }

    /// Fetch one destination with its bucket-list annotation.
    pub async fn get(&self, id: i64) -> CatalogResult<DestinationRead> {
        let destination = sqlx::query_as::<_, Destination>(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CatalogError::DestinationNotFound(id))?;

        let item_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM bucket_list_items WHERE destination_id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(DestinationRead::new(destination, item_id))
    }

    /// Distinct country names, optionally within one category, sorted.
    pub async fn countries(&self, category: Option<&str>) -> CatalogResult<Vec<String>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT DISTINCT country FROM destinations");
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            builder.push(" WHERE category = ");
            builder.push_bind(category.to_string());
        }
        builder.push(" ORDER BY country ASC");

        let countries = builder
            .build_query_scalar::<String>()
            .fetch_all(&*self.db)
            .await?;
        Ok(countries)
    }

    /// Map destination id -> bucket-list entry id for the given page.
    async fn bucket_items_for(&self, destination_ids: &[i64]) -> CatalogResult<HashMap<i64, i64>> {
        if destination_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT destination_id, id FROM bucket_list_items WHERE destination_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in destination_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64, i64)> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows.into_iter().collect())
    }
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
