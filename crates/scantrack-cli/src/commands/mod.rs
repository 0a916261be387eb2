//! CLI command definitions and dispatch.

pub mod component;
pub mod migrate;
pub mod project;
pub mod scan;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use scantrack_core::config::AppConfig;
use scantrack_core::error::AppError;
use scantrack_database::DatabasePool;
use scantrack_service::{ComponentService, ProjectService, ScanService};

/// Scantrack: record which components each scan of a project found
#[derive(Debug, Parser)]
#[command(name = "scantrack", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Project management
    Project(project::ProjectArgs),
    /// Component management
    Component(component::ComponentArgs),
    /// Scan import and inspection
    Scan(scan::ScanArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config, self.format).await,
            Commands::Project(args) => project::execute(args, config, self.format).await,
            Commands::Component(args) => component::execute(args, config, self.format).await,
            Commands::Scan(args) => scan::execute(args, config, self.format).await,
        }
    }
}

/// Services sharing one connection pool.
pub struct Services {
    pub pool: DatabasePool,
    pub projects: ProjectService,
    pub components: ComponentService,
    pub scans: ScanService,
}

/// Helper: load configuration from file and environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the database and build the services on top of it
pub async fn connect(config: &AppConfig) -> Result<Services, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let stores = pool.stores();

    Ok(Services {
        projects: ProjectService::new(stores.projects),
        components: ComponentService::new(stores.components),
        scans: ScanService::new(stores.scans, config.scan.clone()),
        pool,
    })
}
