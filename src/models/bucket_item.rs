//! Bucket-list entries and the shapes they take on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `bucket_list_items` table.
///
/// At most one entry exists per destination (unique `destination_id`).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct BucketListItem {
    pub id: i64,
    pub destination_id: i64,
    pub visited: bool,

    /// Only meaningful while `visited` is true.
    pub visited_date: Option<NaiveDate>,

    pub notes: Option<String>,

    /// Set once at creation and never updated.
    pub created_at: DateTime<Utc>,
}

impl BucketListItem {
    /// Apply a partial update in place.
    ///
    /// Order matters: `visited` is applied first (defaulting the date to
    /// `today` when marking visited with no date anywhere, clearing it when
    /// marking unvisited), then an explicit `visited_date` overrides that,
    /// then `notes` is replaced. Absent fields are left alone.
    pub fn apply(&mut self, patch: &BucketListUpdate, today: NaiveDate) {
        if let Some(visited) = patch.visited {
            self.visited = visited;
            if visited {
                if self.visited_date.is_none() && patch.visited_date.is_none() {
                    self.visited_date = Some(today);
                }
            } else {
                self.visited_date = None;
            }
        }

        if let Some(date) = patch.visited_date {
            self.visited_date = Some(date);
        }

        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }
}

/// Body of `POST /api/bucketlist`.
#[derive(Deserialize, Clone, Debug)]
pub struct BucketListCreate {
    pub destination_id: i64,
    pub notes: Option<String>,
}

/// Body of `PATCH /api/bucketlist/{id}`. A JSON `null` counts as absent.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct BucketListUpdate {
    pub visited: Option<bool>,
    pub visited_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// A bucket-list entry joined with the fields of its destination.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct BucketListRead {
    pub id: i64,
    pub destination_id: i64,
    pub visited: bool,
    pub visited_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub destination_name: String,
    pub destination_category: String,
    pub destination_country: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub destination_image_url: Option<String>,
}

/// A bucket-list entry projected for rendering as a map pin.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct MapMarker {
    pub bucket_item_id: i64,
    pub destination_id: i64,
    pub name: String,
    pub category: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub visited: bool,
}
