use crate::services::metadata::MetadataRepository;
use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    Ok(db)
}

/// Brings `image_metadata` to the shape the ingestion handler writes.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = MetadataRepository::new(db.clone());

    info!("🔄 Ensuring table 'image_metadata' exists...");
    repo.ensure_base_table().await?;

    info!("🔄 Checking optional columns...");
    repo.add_optional_columns().await?;

    Ok(())
}
