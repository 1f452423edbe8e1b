use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::locations::repo_types::Location;
use crate::store::PgStore;

#[async_trait]
pub trait LocationRepo: Send + Sync {
    /// Inserts a location and links it to the search-log row for `zip`.
    async fn record_location(&self, user_id: Uuid, zip: &str, city: &str) -> anyhow::Result<Location>;
    async fn list_all_locations(&self) -> anyhow::Result<Vec<Location>>;
    async fn list_locations_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Location>>;
}

#[async_trait]
impl LocationRepo for PgStore {
    async fn record_location(&self, user_id: Uuid, zip: &str, city: &str) -> anyhow::Result<Location> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (zip, city, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, zip, city, user_id, created_at
            "#,
        )
        .bind(zip)
        .bind(city)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert location")?;

        // no-op update so RETURNING yields the id on conflict too
        let (log_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO searchlog (query)
            VALUES ($1)
            ON CONFLICT (query) DO UPDATE SET query = EXCLUDED.query
            RETURNING id
            "#,
        )
        .bind(zip)
        .fetch_one(&mut *tx)
        .await
        .context("upsert searchlog")?;

        sqlx::query(
            r#"
            INSERT INTO a_search_locations (searchlog_id, locations_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(log_id)
        .bind(location.id)
        .execute(&mut *tx)
        .await
        .context("link searchlog")?;

        tx.commit().await.context("commit tx")?;
        Ok(location)
    }

    async fn list_all_locations(&self) -> anyhow::Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, zip, city, user_id, created_at
              FROM locations
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list all locations")?;
        Ok(rows)
    }

    async fn list_locations_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, zip, city, user_id, created_at
              FROM locations
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list locations by user")?;
        Ok(rows)
    }
}
