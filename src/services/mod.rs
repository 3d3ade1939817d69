pub mod bucketlist_service;
pub mod destination_service;
pub mod seed_service;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db;
    use chrono::Utc;
    use sqlx::SqlitePool;

    pub async fn memory_pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn insert_destination(
        db: &SqlitePool,
        name: &str,
        category: &str,
        country: &str,
        population: Option<i64>,
    ) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO destinations (name, category, country, latitude, longitude, population)
             VALUES (?, ?, ?, 10.0, 20.0, ?) RETURNING id",
        )
        .bind(name)
        .bind(category)
        .bind(country)
        .bind(population)
        .fetch_one(db)
        .await
        .unwrap()
    }

    pub async fn insert_bucket_item(db: &SqlitePool, destination_id: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO bucket_list_items (destination_id, visited, created_at)
             VALUES (?, 0, ?) RETURNING id",
        )
        .bind(destination_id)
        .bind(Utc::now())
        .fetch_one(db)
        .await
        .unwrap()
    }
}
