//! BucketListService — CRUD over bucket-list entries.
//!
//! Duplicate entries are prevented by the unique index on
//! `bucket_list_items.destination_id`; a violation on insert is reported as
//! `BucketListError::AlreadyListed` so concurrent adds cannot both succeed.

use crate::{
    db::BEGIN_WRITE,
    models::bucket_item::{BucketListItem, BucketListRead, BucketListUpdate, MapMarker},
};
use chrono::{Local, NaiveDate, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const JOINED_SELECT: &str = "SELECT b.id, b.destination_id, b.visited, b.visited_date, b.notes, \
     b.created_at, d.name AS destination_name, d.category AS destination_category, \
     d.country AS destination_country, d.latitude AS destination_latitude, \
     d.longitude AS destination_longitude, d.image_url AS destination_image_url \
     FROM bucket_list_items b JOIN destinations d ON d.id = b.destination_id";

#[derive(Clone, Debug, Default)]
pub struct ListEntriesParams {
    pub visited: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Error)]
pub enum BucketListError {
    #[error("destination `{0}` not found")]
    DestinationNotFound(i64),
    #[error("bucket list item `{0}` not found")]
    ItemNotFound(i64),
    #[error("destination `{0}` is already in the bucket list")]
    AlreadyListed(i64),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type BucketListResult<T> = Result<T, BucketListError>;

#[derive(Clone)]
pub struct BucketListService {
    pub db: Arc<SqlitePool>,
}

impl BucketListService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All entries with their destinations, newest first.
    pub async fn list(&self, params: &ListEntriesParams) -> BucketListResult<Vec<BucketListRead>> {
        let mut builder = QueryBuilder::<Sqlite>::new(JOINED_SELECT);
        builder.push(" WHERE 1 = 1");
        if let Some(visited) = params.visited {
            builder.push(" AND b.visited = ");
            builder.push_bind(visited);
        }
        if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
            builder.push(" AND d.category = ");
            builder.push_bind(category.to_string());
        }
        builder.push(" ORDER BY b.created_at DESC, b.id DESC");

        let rows = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }

    /// Put a destination on the bucket list.
    ///
    /// Fails with `DestinationNotFound` for unknown destinations and with
    /// `AlreadyListed` when the destination already has an entry.
    pub async fn add(
        &self,
        destination_id: i64,
        notes: Option<String>,
    ) -> BucketListResult<BucketListRead> {
        let mut tx = self.db.begin_with(BEGIN_WRITE).await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM destinations WHERE id = ?")
            .bind(destination_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Err(BucketListError::DestinationNotFound(destination_id));
        }

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO bucket_list_items (destination_id, visited, visited_date, notes, created_at)
             VALUES (?, 0, NULL, ?, ?)
             RETURNING id",
        )
        .bind(destination_id)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(err) if is_unique_violation(&err) => {
                return Err(BucketListError::AlreadyListed(destination_id));
            }
            Err(err) => return Err(BucketListError::Sqlx(err)),
        };

        let entry = fetch_joined(&mut tx, id).await?;
        tx.commit().await?;
        debug!("added destination {} as bucket list item {}", destination_id, id);
        Ok(entry)
    }

    /// Apply a partial update using today's local date for defaults.
    pub async fn update(
        &self,
        id: i64,
        patch: &BucketListUpdate,
    ) -> BucketListResult<BucketListRead> {
        self.update_on(id, patch, Local::now().date_naive()).await
    }

    /// Apply a partial update, treating `today` as the current date.
    pub async fn update_on(
        &self,
        id: i64,
        patch: &BucketListUpdate,
        today: NaiveDate,
    ) -> BucketListResult<BucketListRead> {
        let mut tx = self.db.begin_with(BEGIN_WRITE).await?;

        let mut item = sqlx::query_as::<_, BucketListItem>(
            "SELECT id, destination_id, visited, visited_date, notes, created_at
             FROM bucket_list_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BucketListError::ItemNotFound(id))?;

        item.apply(patch, today);

        sqlx::query(
            "UPDATE bucket_list_items SET visited = ?, visited_date = ?, notes = ? WHERE id = ?",
        )
        .bind(item.visited)
        .bind(item.visited_date)
        .bind(&item.notes)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_joined(&mut tx, id).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Remove an entry. The destination itself is untouched.
    pub async fn delete(&self, id: i64) -> BucketListResult<()> {
        let result = sqlx::query("DELETE FROM bucket_list_items WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BucketListError::ItemNotFound(id));
        }
        Ok(())
    }

    /// Entries projected as map pins, optionally only visited ones.
    pub async fn map_markers(&self, visited_only: bool) -> BucketListResult<Vec<MapMarker>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT b.id AS bucket_item_id, d.id AS destination_id, d.name, d.category, \
             d.country, d.latitude, d.longitude, b.visited \
             FROM bucket_list_items b JOIN destinations d ON d.id = b.destination_id",
        );
        if visited_only {
            builder.push(" WHERE b.visited = 1");
        }
        builder.push(" ORDER BY b.id ASC");

        let markers = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(markers)
    }
}

async fn fetch_joined(conn: &mut SqliteConnection, id: i64) -> BucketListResult<BucketListRead> {
    sqlx::query_as::<_, BucketListRead>(&format!("{JOINED_SELECT} WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(BucketListError::ItemNotFound(id))
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{insert_destination, memory_pool};

    async fn service() -> BucketListService {
        BucketListService::new(Arc::new(memory_pool().await))
    }

    async fn count_items(svc: &BucketListService) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM bucket_list_items")
            .fetch_one(&*svc.db)
            .await
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn add_creates_unvisited_entry_joined_with_destination() {
        let svc = service().await;
        let dest = insert_destination(&svc.db, "Kyoto", "city", "Japan", Some(1_400_000)).await;

        let entry = svc.add(dest, Some("temples".into())).await.unwrap();
        assert_eq!(entry.destination_id, dest);
        assert!(!entry.visited);
        assert_eq!(entry.visited_date, None);
        assert_eq!(entry.notes.as_deref(), Some("temples"));
        assert_eq!(entry.destination_name, "Kyoto");
        assert_eq!(entry.destination_category, "city");
        assert_eq!(entry.destination_country, "Japan");
    }

    #[tokio::test]
    async fn duplicate_add_conflicts_and_keeps_one_entry() {
        let svc = service().await;
        let dest = insert_destination(&svc.db, "Lima", "city", "Peru", Some(9_000_000)).await;

        svc.add(dest, None).await.unwrap();
        let err = svc.add(dest, None).await.unwrap_err();
        assert!(matches!(err, BucketListError::AlreadyListed(id) if id == dest));
        assert_eq!(count_items(&svc).await, 1);
    }

    #[tokio::test]
    async fn add_for_unknown_destination_leaves_no_trace() {
        let svc = service().await;
        let err = svc.add(42, None).await.unwrap_err();
        assert!(matches!(err, BucketListError::DestinationNotFound(42)));
        assert_eq!(count_items(&svc).await, 0);
    }

    #[tokio::test]
    async fn visiting_twice_keeps_first_date() {
        let svc = service().await;
        let dest = insert_destination(&svc.db, "Oslo", "city", "Norway", Some(700_000)).await;
        let entry = svc.add(dest, None).await.unwrap();
        let visit = BucketListUpdate {
            visited: Some(true),
            ..Default::default()
        };

        let first = svc.update_on(entry.id, &visit, date(2026, 10, 17)).await.unwrap();
        assert!(first.visited);
        assert_eq!(first.visited_date, Some(date(2026, 10, 17)));

        let second = svc.update_on(entry.id, &visit, date(2026, 10, 18)).await.unwrap();
        assert_eq!(second.visited_date, Some(date(2026, 10, 17)));
        assert_eq!(second.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn unvisiting_clears_date() {
        let svc = service().await;
        let dest = insert_destination(&svc.db, "Cusco", "city", "Peru", Some(430_000)).await;
        let entry = svc.add(dest, None).await.unwrap();
        svc.update_on(
            entry.id,
            &BucketListUpdate {
                visited: Some(true),
                visited_date: Some(date(2020, 3, 4)),
                notes: None,
            },
            date(2026, 10, 17),
        )
        .await
        .unwrap();

        let cleared = svc
            .update_on(
                entry.id,
                &BucketListUpdate {
                    visited: Some(false),
                    ..Default::default()
                },
                date(2026, 10, 17),
            )
            .await
            .unwrap();
        assert!(!cleared.visited);
        assert_eq!(cleared.visited_date, None);
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let svc = service().await;
        let err = svc
            .update(7, &BucketListUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BucketListError::ItemNotFound(7)));
    }

    #[tokio::test]
    async fn delete_removes_entry_but_not_destination() {
        let svc = service().await;
        let dest = insert_destination(&svc.db, "Petra", "landmark", "Jordan", None).await;
        let entry = svc.add(dest, None).await.unwrap();

        svc.delete(entry.id).await.unwrap();
        assert!(svc.list(&ListEntriesParams::default()).await.unwrap().is_empty());

        let destinations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM destinations")
            .fetch_one(&*svc.db)
            .await
            .unwrap();
        assert_eq!(destinations, 1);

        let err = svc.delete(entry.id).await.unwrap_err();
        assert!(matches!(err, BucketListError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let svc = service().await;
        let rome = insert_destination(&svc.db, "Rome", "city", "Italy", Some(2_800_000)).await;
        let colosseum = insert_destination(&svc.db, "Colosseum", "landmark", "Italy", None).await;
        let first = svc.add(rome, None).await.unwrap();
        let second = svc.add(colosseum, None).await.unwrap();
        svc.update_on(
            first.id,
            &BucketListUpdate {
                visited: Some(true),
                ..Default::default()
            },
            date(2026, 1, 1),
        )
        .await
        .unwrap();

        let all = svc.list(&ListEntriesParams::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let visited = svc
            .list(&ListEntriesParams {
                visited: Some(true),
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(visited.len(), 1);
        assert_eq!(visited[0].id, first.id);

        let landmarks = svc
            .list(&ListEntriesParams {
                visited: None,
                category: Some("landmark".into()),
            })
            .await
            .unwrap();
        assert_eq!(landmarks.len(), 1);
        assert_eq!(landmarks[0].destination_name, "Colosseum");
    }

    #[tokio::test]
    async fn map_markers_project_coordinates() {
        let svc = service().await;
        let a = insert_destination(&svc.db, "Quito", "city", "Ecuador", Some(2_000_000)).await;
        let b = insert_destination(&svc.db, "Machu Picchu", "landmark", "Peru", None).await;
        let entry_a = svc.add(a, None).await.unwrap();
        svc.add(b, None).await.unwrap();
        svc.update_on(
            entry_a.id,
            &BucketListUpdate {
                visited: Some(true),
                ..Default::default()
            },
            date(2026, 2, 2),
        )
        .await
        .unwrap();

        let all = svc.map_markers(false).await.unwrap();
        assert_eq!(all.len(), 2);

        let visited = svc.map_markers(true).await.unwrap();
        assert_eq!(visited.len(), 1);
        let marker = &visited[0];
        assert_eq!(marker.bucket_item_id, entry_a.id);
        assert_eq!(marker.destination_id, a);
        assert_eq!(marker.name, "Quito");
        assert_eq!(marker.country, "Ecuador");
        assert!(marker.visited);
    }

    async fn file_backed_service(dir: &tempfile::TempDir) -> BucketListService {
        let url = format!("sqlite://{}", dir.path().join("travel.db").display());
        let pool = crate::db::connect(&url, crate::db::DEFAULT_MAX_CONNECTIONS)
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        BucketListService::new(Arc::new(pool))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_on_shared_file_pool_do_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let svc = file_backed_service(&dir).await;

        let mut destinations = Vec::new();
        for i in 0..16 {
            destinations.push(
                insert_destination(&svc.db, &format!("Town {i}"), "city", "Chile", Some(60_000))
                    .await,
            );
        }

        let adds = destinations
            .iter()
            .map(|&dest| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.add(dest, None).await })
            })
            .collect::<Vec<_>>();
        let mut entries = Vec::new();
        for handle in adds {
            entries.push(handle.await.unwrap().unwrap());
        }
        assert_eq!(count_items(&svc).await, 16);

        let visit = BucketListUpdate {
            visited: Some(true),
            ..Default::default()
        };
        let patches = entries
            .iter()
            .flat_map(|entry| [entry.id, entry.id])
            .map(|id| {
                let svc = svc.clone();
                let visit = visit.clone();
                tokio::spawn(async move { svc.update_on(id, &visit, date(2026, 5, 1)).await })
            })
            .collect::<Vec<_>>();
        for handle in patches {
            let updated = handle.await.unwrap().unwrap();
            assert_eq!(updated.visited_date, Some(date(2026, 5, 1)));
        }

        svc.db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_adds_yield_one_entry_and_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let svc = file_backed_service(&dir).await;
        let dest = insert_destination(&svc.db, "Valparaiso", "city", "Chile", Some(300_000)).await;

        let handles = (0..12)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.add(dest, None).await })
            })
            .collect::<Vec<_>>();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(BucketListError::AlreadyListed(id)) => assert_eq!(id, dest),
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(count_items(&svc).await, 1);

        svc.db.close().await;
    }
}
