//! A seeded point of interest: a city or a landmark.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category value used for rows imported from the world-cities file.
pub const CATEGORY_CITY: &str = "city";

/// Category value used for rows imported from the landmarks file.
pub const CATEGORY_LANDMARK: &str = "landmark";

/// A destination row as stored in the `destinations` table.
///
/// Rows are only ever written by the seeding step; the API never mutates them.
/// `category` is an open string, but seeding only produces `"city"` and
/// `"landmark"`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub country: String,

    /// ISO 3166-1 alpha-2 code, when known.
    pub country_code: Option<String>,

    /// Coarse geographic grouping (e.g. "Europe", "Other").
    pub region: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// Only populated for cities.
    pub population: Option<i64>,

    /// Only populated for landmarks.
    pub description: Option<String>,

    pub image_url: Option<String>,
}

/// A destination row that has not been inserted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewDestination {
    pub name: String,
    pub category: String,
    pub country: String,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub population: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A destination annotated with its bucket-list membership.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DestinationRead {
    #[serde(flatten)]
    pub destination: Destination,

    /// True iff a bucket-list entry references this destination.
    pub in_bucketlist: bool,

    /// Id of that entry, present exactly when `in_bucketlist` is true.
    pub bucket_item_id: Option<i64>,
}

impl DestinationRead {
    pub fn new(destination: Destination, bucket_item_id: Option<i64>) -> Self {
        Self {
            destination,
            in_bucketlist: bucket_item_id.is_some(),
            bucket_item_id,
        }
    }
}
