use crate::config::StorageConfig;
use crate::entities::image_metadata;
use crate::services::metadata::{ColumnOutcome, MetadataRepository, PlatformCount, Totals};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use tracing::{error, info};
use uuid::Uuid;

/// (blob name, capture time as (y, m, d, h, min), platform, AI flag)
const FIXTURE_ROWS: [(&str, (i32, u32, u32, u32, u32), &str, bool); 8] = [
    ("reddit_abc123.jpg", (2026, 2, 20, 10, 0), "reddit", true),
    ("twitter_def456.jpg", (2026, 2, 20, 11, 30), "twitter", false),
    ("reddit_ghi789.jpg", (2026, 2, 20, 14, 15), "reddit", true),
    ("instagram_jkl012.jpg", (2026, 2, 21, 9, 0), "instagram", false),
    ("twitter_mno345.jpg", (2026, 2, 21, 12, 45), "twitter", true),
    ("facebook_pqr678.jpg", (2026, 2, 21, 15, 30), "facebook", true),
    ("reddit_stu901.jpg", (2026, 2, 21, 16, 0), "reddit", false),
    ("youtube_vwx234.jpg", (2026, 2, 21, 18, 20), "youtube", true),
];

fn fixture_time((y, m, d, h, min): (i32, u32, u32, u32, u32)) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// The illustrative batch, each row with a fresh `image_id`.
pub fn fixture_records(storage: &StorageConfig) -> Vec<image_metadata::Model> {
    FIXTURE_ROWS
        .iter()
        .map(|(blob, at, platform, ai)| image_metadata::Model {
            image_id: Uuid::new_v4().to_string(),
            gcs_url: storage.object_uri(blob),
            captured_at: fixture_time(*at),
            platform_name: Some(platform.to_string()),
            is_ai_gen: Some(*ai),
        })
        .collect()
}

/// Outcome of every seeding step. A failed step never prevents the next one
/// from running, so each is kept separately.
#[derive(Debug)]
pub struct SeedReport {
    pub columns: anyhow::Result<Vec<(&'static str, ColumnOutcome)>>,
    pub inserted: anyhow::Result<u64>,
    pub breakdown: anyhow::Result<Vec<PlatformCount>>,
    pub totals: anyhow::Result<Totals>,
}

impl SeedReport {
    pub fn is_success(&self) -> bool {
        self.columns.is_ok()
            && self.inserted.is_ok()
            && self.breakdown.is_ok()
            && self.totals.is_ok()
    }
}

fn flag_label(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Image Metadata Setup ===")?;

        writeln!(f, "\nStep 1: Adding columns to table...")?;
        match &self.columns {
            Ok(outcomes) => {
                for (name, outcome) in outcomes {
                    match outcome {
                        ColumnOutcome::Added => writeln!(f, "  ✓ Added column {name}")?,
                        ColumnOutcome::AlreadyPresent => {
                            writeln!(f, "  Note: column {name} already exists")?
                        }
                    }
                }
            }
            Err(e) => writeln!(f, "  Error: {e:#}")?,
        }

        writeln!(f, "\nStep 2: Inserting fixture rows...")?;
        match &self.inserted {
            Ok(n) => writeln!(f, "  ✓ Inserted {n} rows")?,
            Err(e) => writeln!(f, "  Error: {e:#}")?,
        }

        writeln!(f, "\nStep 3: Verifying data...")?;
        match &self.breakdown {
            Ok(rows) => {
                writeln!(f, "\n  Data summary:")?;
                for row in rows {
                    writeln!(
                        f,
                        "  {}: AI={} -> {} images",
                        row.platform_name.as_deref().unwrap_or("unknown"),
                        flag_label(row.is_ai_gen),
                        row.count
                    )?;
                }
            }
            Err(e) => writeln!(f, "  Error: {e:#}")?,
        }

        match &self.totals {
            Ok(t) => writeln!(
                f,
                "\nTotal: {} images, {} AI-generated ({:.1}%)",
                t.total,
                t.ai_count,
                t.ai_percentage()
            )?,
            Err(e) => writeln!(f, "\n  Error: {e:#}")?,
        }

        Ok(())
    }
}

pub struct Seeder {
    repo: MetadataRepository,
    storage: StorageConfig,
}

impl Seeder {
    pub fn new(repo: MetadataRepository, storage: StorageConfig) -> Self {
        Self { repo, storage }
    }

    /// Schema alteration, fixture insert, then the two read-only aggregates.
    pub async fn ensure_schema_and_seed(&self) -> SeedReport {
        info!("🌱 Seeding image metadata...");

        let columns = match self.repo.ensure_base_table().await {
            Ok(()) => self
                .repo
                .add_optional_columns()
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e).context("failed to create image_metadata")),
        };
        if let Err(e) = &columns {
            error!("❌ Schema step failed: {:#}", e);
        }

        let records = fixture_records(&self.storage);
        let inserted = self
            .repo
            .insert_many(&records)
            .await
            .map_err(anyhow::Error::from);
        match &inserted {
            Ok(n) => info!("✅ Inserted {} fixture rows", n),
            Err(e) => error!("❌ Fixture insert failed: {:#}", e),
        }

        let breakdown = self
            .repo
            .count_by_platform()
            .await
            .map_err(anyhow::Error::from);
        if let Err(e) = &breakdown {
            error!("❌ Breakdown query failed: {:#}", e);
        }

        let totals = self.repo.totals().await.map_err(anyhow::Error::from);
        if let Err(e) = &totals {
            error!("❌ Totals query failed: {:#}", e);
        }

        SeedReport {
            columns,
            inserted,
            breakdown,
            totals,
        }
    }
}
