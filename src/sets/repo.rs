use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::locations::repo_types::Location;
use crate::sets::repo_types::{SetSummary, WeatherSet};
use crate::store::PgStore;

/// Name lookups are per owner and return the earliest-created match.
#[async_trait]
pub trait SetRepo: Send + Sync {
    async fn find_set_by_name(&self, user_id: Uuid, name: &str) -> anyhow::Result<Option<WeatherSet>>;
    async fn find_set(&self, user_id: Uuid, set_id: Uuid) -> anyhow::Result<Option<WeatherSet>>;
    async fn create_set(&self, user_id: Uuid, name: &str, location_ids: &[Uuid]) -> anyhow::Result<WeatherSet>;
    async fn list_sets(&self, user_id: Uuid) -> anyhow::Result<Vec<SetSummary>>;
    /// Locations in the order they were added to the set.
    async fn list_set_locations(&self, set_id: Uuid) -> anyhow::Result<Vec<Location>>;
    async fn rename_set(&self, set_id: Uuid, name: &str) -> anyhow::Result<()>;
    async fn delete_set(&self, set_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
impl SetRepo for PgStore {
    async fn find_set_by_name(&self, user_id: Uuid, name: &str) -> anyhow::Result<Option<WeatherSet>> {
        let set = sqlx::query_as::<_, WeatherSet>(
            r#"
            SELECT id, name, user_id, created_at
              FROM userweatherset
             WHERE user_id = $1 AND name = $2
             ORDER BY created_at ASC, id ASC
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .context("find set by name")?;
        Ok(set)
    }

    async fn find_set(&self, user_id: Uuid, set_id: Uuid) -> anyhow::Result<Option<WeatherSet>> {
        let set = sqlx::query_as::<_, WeatherSet>(
            r#"
            SELECT id, name, user_id, created_at
              FROM userweatherset
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(set_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find set by id")?;
        Ok(set)
    }

    async fn create_set(&self, user_id: Uuid, name: &str, location_ids: &[Uuid]) -> anyhow::Result<WeatherSet> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let set = sqlx::query_as::<_, WeatherSet>(
            r#"
            INSERT INTO userweatherset (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id, created_at
            "#,
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert set")?;

        for (position, location_id) in location_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO a_user_collection (locations_id, userweatherset_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(location_id)
            .bind(set.id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .context("link set location")?;
        }

        tx.commit().await.context("commit tx")?;
        Ok(set)
    }

    async fn list_sets(&self, user_id: Uuid) -> anyhow::Result<Vec<SetSummary>> {
        let rows = sqlx::query_as::<_, SetSummary>(
            r#"
            SELECT s.id, s.name, s.created_at, COUNT(c.locations_id) AS location_count
              FROM userweatherset s
              LEFT JOIN a_user_collection c ON c.userweatherset_id = s.id
             WHERE s.user_id = $1
             GROUP BY s.id
             ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list sets")?;
        Ok(rows)
    }

    async fn list_set_locations(&self, set_id: Uuid) -> anyhow::Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>(
            r#"
            SELECT l.id, l.zip, l.city, l.user_id, l.created_at
              FROM a_user_collection c
              JOIN locations l ON l.id = c.locations_id
             WHERE c.userweatherset_id = $1
             ORDER BY c.position ASC
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.db)
        .await
        .context("list set locations")?;
        Ok(rows)
    }

    async fn rename_set(&self, set_id: Uuid, name: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE userweatherset SET name = $2 WHERE id = $1")
            .bind(set_id)
            .bind(name)
            .execute(&self.db)
            .await
            .context("rename set")?;
        Ok(())
    }

    async fn delete_set(&self, set_id: Uuid) -> anyhow::Result<bool> {
        // join rows go with it via ON DELETE CASCADE; locations stay
        let res = sqlx::query("DELETE FROM userweatherset WHERE id = $1")
            .bind(set_id)
            .execute(&self.db)
            .await
            .context("delete set")?;
        Ok(res.rows_affected() > 0)
    }
}
