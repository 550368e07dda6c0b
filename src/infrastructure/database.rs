use std::env;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

pub async fn setup_database() -> anyhow::Result<SqlitePool> {
    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://candidate_portal.db".to_string());

    info!("📂 Database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    info!("✅ Database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("🔄 Migrations up to date");

    Ok(pool)
}
