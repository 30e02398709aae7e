use crate::entities::{image_metadata, prelude::*};
use sea_orm::sea_query::{ColumnDef, Expr, Func, NullOrdering, Order, SimpleExpr, Table};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityName, EntityTrait, FromQueryResult, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Result of trying to add one optional column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Error)]
#[error("Failed to add column '{column}': {source}")]
pub struct SchemaAlterError {
    pub column: &'static str,
    #[source]
    pub source: DbErr,
}

/// One row of the per-platform breakdown
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct PlatformCount {
    pub platform_name: Option<String>,
    pub is_ai_gen: Option<bool>,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: i64,
    pub ai_count: i64,
}

impl Totals {
    pub fn ai_percentage(&self) -> f64 {
        if self.total > 0 {
            self.ai_count as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total: i64,
    ai_count: Option<i64>,
}

/// Access to the `image_metadata` table
#[derive(Clone)]
pub struct MetadataRepository {
    db: DatabaseConnection,
}

impl MetadataRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the table with its three mandatory columns if it is missing.
    pub async fn ensure_base_table(&self) -> Result<(), DbErr> {
        let builder = self.db.get_database_backend();
        let stmt = Table::create()
            .table(ImageMetadata.table_ref())
            .if_not_exists()
            .col(
                ColumnDef::new(image_metadata::Column::ImageId)
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(image_metadata::Column::GcsUrl).text().not_null())
            .col(
                ColumnDef::new(image_metadata::Column::CapturedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        self.db.execute(builder.build(&stmt)).await?;
        Ok(())
    }

    /// Adds `platform_name` and `is_AIgen`. Plain `ADD COLUMN` is issued for
    /// each; an "already exists" failure counts as success, anything else is
    /// returned.
    pub async fn add_optional_columns(
        &self,
    ) -> Result<Vec<(&'static str, ColumnOutcome)>, SchemaAlterError> {
        let builder = self.db.get_database_backend();
        let columns = [
            (
                "platform_name",
                ColumnDef::new(image_metadata::Column::PlatformName)
                    .text()
                    .to_owned(),
            ),
            (
                "is_AIgen",
                ColumnDef::new(image_metadata::Column::IsAiGen)
                    .boolean()
                    .to_owned(),
            ),
        ];

        let mut outcomes = Vec::with_capacity(columns.len());
        for (name, def) in columns {
            let stmt = Table::alter()
                .table(ImageMetadata.table_ref())
                .add_column(def)
                .to_owned();

            match self.db.execute(builder.build(&stmt)).await {
                Ok(_) => {
                    info!("   - Added column '{}'", name);
                    outcomes.push((name, ColumnOutcome::Added));
                }
                Err(e) if is_already_exists(&e) => {
                    info!("   - Column '{}' already exists (skipped): {}", name, e);
                    outcomes.push((name, ColumnOutcome::AlreadyPresent));
                }
                Err(source) => {
                    return Err(SchemaAlterError {
                        column: name,
                        source,
                    });
                }
            }
        }

        Ok(outcomes)
    }

    pub async fn insert(&self, record: &image_metadata::Model) -> Result<(), DbErr> {
        ImageMetadata::insert(to_active_model(record))
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn insert_many(&self, records: &[image_metadata::Model]) -> Result<u64, DbErr> {
        if records.is_empty() {
            return Ok(0);
        }
        ImageMetadata::insert_many(records.iter().map(to_active_model))
            .exec_without_returning(&self.db)
            .await
    }

    pub async fn find(&self, image_id: &str) -> Result<Option<image_metadata::Model>, DbErr> {
        ImageMetadata::find_by_id(image_id.to_owned())
            .one(&self.db)
            .await
    }

    /// Row counts grouped by `(platform_name, is_AIgen)`, ordered by platform
    /// then flag: `true`, `false`, unflagged. NULLs go last on every backend.
    pub async fn count_by_platform(&self) -> Result<Vec<PlatformCount>, DbErr> {
        ImageMetadata::find()
            .select_only()
            .column(image_metadata::Column::PlatformName)
            .column_as(image_metadata::Column::IsAiGen, "is_ai_gen")
            .column_as(Expr::col(image_metadata::Column::ImageId).count(), "count")
            .group_by(image_metadata::Column::PlatformName)
            .group_by(image_metadata::Column::IsAiGen)
            .order_by_with_nulls(image_metadata::Column::PlatformName, Order::Asc, NullOrdering::Last)
            .order_by_with_nulls(image_metadata::Column::IsAiGen, Order::Desc, NullOrdering::Last)
            .into_model::<PlatformCount>()
            .all(&self.db)
            .await
    }

    pub async fn totals(&self) -> Result<Totals, DbErr> {
        let ai_flagged: SimpleExpr = Expr::case(Expr::col(image_metadata::Column::IsAiGen).eq(true), 1)
            .finally(0)
            .into();

        let row = ImageMetadata::find()
            .select_only()
            .column_as(Expr::col(image_metadata::Column::ImageId).count(), "total")
            .column_as(SimpleExpr::from(Func::sum(ai_flagged)), "ai_count")
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await?;

        Ok(row
            .map(|r| Totals {
                total: r.total,
                ai_count: r.ai_count.unwrap_or(0),
            })
            .unwrap_or(Totals {
                total: 0,
                ai_count: 0,
            }))
    }
}

fn to_active_model(record: &image_metadata::Model) -> image_metadata::ActiveModel {
    image_metadata::ActiveModel {
        image_id: Set(record.image_id.clone()),
        gcs_url: Set(record.gcs_url.clone()),
        captured_at: Set(record.captured_at),
        platform_name: Set(record.platform_name.clone()),
        is_ai_gen: Set(record.is_ai_gen),
    }
}

/// SQLite reports `duplicate column name`, PostgreSQL `... already exists`.
pub fn is_already_exists(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("duplicate column") || msg.contains("already exists")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn test_already_exists_detection() {
        let sqlite = DbErr::Exec(RuntimeErr::Internal(
            "duplicate column name: platform_name".to_string(),
        ));
        let postgres = DbErr::Exec(RuntimeErr::Internal(
            "column \"is_AIgen\" of relation \"image_metadata\" already exists".to_string(),
        ));
        let other = DbErr::Exec(RuntimeErr::Internal("no such table: image_metadata".to_string()));

        assert!(is_already_exists(&sqlite));
        assert!(is_already_exists(&postgres));
        assert!(!is_already_exists(&other));
    }

    #[test]
    fn test_ai_percentage() {
        let totals = Totals {
            total: 8,
            ai_count: 5,
        };
        assert_eq!(totals.ai_percentage(), 62.5);

        let empty = Totals {
            total: 0,
            ai_count: 0,
        };
        assert_eq!(empty.ai_percentage(), 0.0);
    }
}
