use std::marker::PhantomData;

use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::Row as _;

/// Something stored as one JSON document per row, keyed by its id.
pub trait Entity: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table name, also used as label in log and error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

pub struct EntityRepository<T> {
    pool: sqlx::SqlitePool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityRepository<T> {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// All entities in insertion order. Updates keep the original position.
    #[tracing::instrument(skip(self), fields(kind = T::KIND))]
    pub async fn load_all(&self) -> anyhow::Result<Vec<T>> {
        let rows = sqlx::query(&format!("SELECT id, data FROM {} ORDER BY seq ASC", T::KIND))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Error loading all {}", T::KIND))?;

        let mut result = Vec::with_capacity(rows.len());

        for row in rows {
            let id: String = row.try_get("id")?;
            let data: String = row.try_get("data")?;

            match serde_json::from_str::<T>(&data) {
                Ok(entity) => result.push(entity),
                Err(e) => tracing::error!("Skipping unreadable {} {}: {:?}", T::KIND, id, e),
            }
        }

        Ok(result)
    }

    #[tracing::instrument(skip_all, fields(kind = T::KIND, id = entity.id()))]
    pub async fn upsert(&self, entity: &T) -> anyhow::Result<()> {
        let data = serde_json::to_string(entity)?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            T::KIND
        ))
        .bind(entity.id())
        .bind(data)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .with_context(|| format!("Error saving {} {}", T::KIND, entity.id()))
    }

    pub async fn upsert_all(&self, entities: &[T]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for entity in entities {
            sqlx::query(&format!(
                "INSERT INTO {} (id, data) VALUES ($1, $2) ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                T::KIND
            ))
            .bind(entity.id())
            .bind(serde_json::to_string(entity)?)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Error saving {} {}", T::KIND, entity.id()))?;
        }

        tx.commit().await.context("Error committing transaction")
    }

    /// Returns whether a row was removed.
    #[tracing::instrument(skip(self), fields(kind = T::KIND))]
    pub async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::KIND))
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Error deleting {} {}", T::KIND, id))?;

        Ok(result.rows_affected() > 0)
    }
}
