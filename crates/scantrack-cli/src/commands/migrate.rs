//! Database migration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use scantrack_core::config::AppConfig;
use scantrack_core::error::AppError;
use scantrack_database::migration;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show applied migrations
    Status,
}

/// Applied migration display row
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Version
    version: i64,
    /// Description
    description: String,
    /// Applied successfully
    success: bool,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect(config).await?;
    let pool = services.pool.pool();

    match &args.command {
        MigrateCommand::Run => {
            migration::run_migrations(pool).await?;
            output::print_success("All migrations applied.");
        }
        MigrateCommand::Status => {
            let reachable = services.pool.health_check().await?;
            if format == OutputFormat::Table {
                output::print_kv("Database", if reachable { "reachable" } else { "unexpected reply" });
            }
            let rows: Vec<MigrationRow> = migration::applied_migrations(pool)
                .await?
                .into_iter()
                .map(|m| MigrationRow {
                    version: m.version,
                    description: m.description,
                    success: m.success,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    services.pool.close().await;
    Ok(())
}
