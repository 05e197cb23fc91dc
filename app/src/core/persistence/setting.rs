use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};

/// Single JSON values stored under a fixed key.
#[derive(Clone)]
pub struct SettingRepository {
    pool: sqlx::SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM app_setting WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Error reading setting {}", key))?;

        value
            .map(|v| serde_json::from_str(&v).with_context(|| format!("Error parsing setting {}: {}", key, v)))
            .transpose()
    }

    #[tracing::instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let value = serde_json::to_string(value)?;

        sqlx::query(
            "INSERT INTO app_setting (key, value) VALUES ($1, $2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .with_context(|| format!("Error saving setting {}", key))
    }
}
