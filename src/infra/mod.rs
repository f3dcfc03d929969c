use std::time::Duration;

use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod expiry_sweeper;
pub mod setup;

pub async fn postgres_persistence(
    database_url: &str,
    acquire_timeout: Duration,
) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url, acquire_timeout).await?;
    Ok(PostgresPersistence::new(pool))
}
