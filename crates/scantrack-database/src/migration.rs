//! Database migration runner.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;

use scantrack_core::error::{AppError, ErrorKind};

/// One applied migration as recorded by sqlx.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppliedMigration {
    /// Migration version (timestamp prefix of the file name).
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// Whether the migration completed.
    pub success: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List migrations already applied to the database, oldest first.
pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<AppliedMigration>, AppError> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read migration status", e))
}
