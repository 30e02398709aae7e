use dotenvy::dotenv;
use image_ingest::config::StorageConfig;
use image_ingest::infrastructure::database;
use image_ingest::infrastructure::seed::Seeder;
use image_ingest::services::metadata::MetadataRepository;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,image_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🌱 Starting image metadata seeder...");

    let db = database::setup_database().await?;
    let seeder = Seeder::new(MetadataRepository::new(db), StorageConfig::from_env());

    let report = seeder.ensure_schema_and_seed().await;
    println!("{report}");

    if report.is_success() {
        println!("=== Setup Complete! ===");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("❌ One or more seeding steps failed");
        Ok(ExitCode::FAILURE)
    }
}
