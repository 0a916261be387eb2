//! Component management commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use scantrack_core::config::AppConfig;
use scantrack_core::error::AppError;
use scantrack_core::types::ComponentUuid;
use scantrack_entity::component::CreateComponent;

/// Arguments for component commands
#[derive(Debug, Args)]
pub struct ComponentArgs {
    /// Component subcommand
    #[command(subcommand)]
    pub command: ComponentCommand,
}

/// Component subcommands
#[derive(Debug, Subcommand)]
pub enum ComponentCommand {
    /// Register a component
    Create {
        /// Group or namespace, e.g. a Maven group id
        #[arg(short, long)]
        group: Option<String>,
        /// Component name
        #[arg(short, long)]
        name: String,
        /// Component version
        #[arg(short, long)]
        version: Option<String>,
        /// Package URL
        #[arg(long)]
        purl: Option<String>,
    },
    /// Show a component
    Show {
        /// Component uuid
        uuid: ComponentUuid,
    },
}

/// Execute component commands
pub async fn execute(
    args: &ComponentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect(config).await?;

    match &args.command {
        ComponentCommand::Create {
            group,
            name,
            version,
            purl,
        } => {
            let component = services
                .components
                .create_component(CreateComponent {
                    group: group.clone(),
                    name: name.clone(),
                    version: version.clone(),
                    purl: purl.clone(),
                })
                .await?;

            match format {
                OutputFormat::Json => output::print_item(&component, format),
                OutputFormat::Table => output::print_success(&format!(
                    "Component {} created (uuid: {})",
                    component.coordinates(),
                    component.uuid
                )),
            }
        }
        ComponentCommand::Show { uuid } => {
            let component = services.components.get_component(uuid).await?;
            match format {
                OutputFormat::Json => output::print_item(&component, format),
                OutputFormat::Table => {
                    output::print_kv("UUID", &component.uuid.to_string());
                    output::print_kv("Coordinates", &component.coordinates());
                    output::print_kv("Package URL", component.purl.as_deref().unwrap_or("-"));
                }
            }
        }
    }

    services.pool.close().await;
    Ok(())
}
