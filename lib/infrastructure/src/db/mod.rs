use std::str::FromStr as _;

use anyhow::Context as _;
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    url: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

impl DatabaseConfig {
    /// In-memory databases live per connection, so they are restricted to a single one.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        }
    }

    pub async fn new_pool(&self) -> anyhow::Result<sqlx::SqlitePool> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .with_context(|| format!("Invalid database url {}", self.url))?
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Error connecting to database {}", self.url))
    }
}
