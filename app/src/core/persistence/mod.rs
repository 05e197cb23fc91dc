mod entity;
mod setting;

use anyhow::Context as _;

pub use entity::{Entity, EntityRepository};
pub use setting::SettingRepository;

pub async fn migrate(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Error running database migrations")
}
