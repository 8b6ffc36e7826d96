use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};

pub type PgPool = Pool<Postgres>;

/// Session setting read by the change triggers to pick the notify channel.
pub const CHANGE_CHANNEL_SETTING: &str = "campus.change_channel";

pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
    change_channel: &str,
) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(database_url)?
        .options([(CHANGE_CHANNEL_SETTING, change_channel)]);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    // Uses compile-time embedded migrations under ./migrations
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub mod repositories;
