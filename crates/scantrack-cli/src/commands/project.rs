//! Project management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use scantrack_core::config::AppConfig;
use scantrack_core::error::AppError;
use scantrack_core::types::ProjectUuid;
use scantrack_core::types::pagination::PageRequest;
use scantrack_entity::project::{CreateProject, Project, UpdateProject};

/// Arguments for project commands
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project subcommand
    #[command(subcommand)]
    pub command: ProjectCommand,
}

/// Project subcommands
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Create {
        /// Project name
        #[arg(short, long)]
        name: String,
        /// Project version
        #[arg(short, long)]
        version: Option<String>,
        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit a project's name, version or description
    Update {
        /// Project uuid
        uuid: ProjectUuid,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New version
        #[arg(short, long)]
        version: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List projects
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Items per page
        #[arg(long, default_value = "25")]
        page_size: u64,
    },
    /// Delete a project and all of its scans
    Delete {
        /// Project uuid
        uuid: ProjectUuid,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Project display row
#[derive(Debug, Serialize, Tabled)]
struct ProjectRow {
    /// Project uuid
    uuid: String,
    /// Name
    name: String,
    /// Version
    version: String,
    /// Description
    description: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            uuid: p.uuid.to_string(),
            name: p.name.clone(),
            version: p.version.clone().unwrap_or_default(),
            description: p.description.clone().unwrap_or_default(),
        }
    }
}

/// Execute project commands
pub async fn execute(
    args: &ProjectArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect(config).await?;

    match &args.command {
        ProjectCommand::Create {
            name,
            version,
            description,
        } => {
            let project = services
                .projects
                .create_project(CreateProject {
                    name: name.clone(),
                    version: version.clone(),
                    description: description.clone(),
                })
                .await?;

            match format {
                OutputFormat::Json => output::print_item(&project, format),
                OutputFormat::Table => output::print_success(&format!(
                    "Project '{}' created (uuid: {})",
                    project.name, project.uuid
                )),
            }
        }
        ProjectCommand::Update {
            uuid,
            name,
            version,
            description,
        } => {
            let project = services
                .projects
                .update_project(
                    uuid,
                    UpdateProject {
                        name: name.clone(),
                        version: version.clone(),
                        description: description.clone(),
                    },
                )
                .await?;

            match format {
                OutputFormat::Json => output::print_item(&project, format),
                OutputFormat::Table => {
                    output::print_success(&format!("Project {} updated", project.uuid));
                    print_project(&project);
                }
            }
        }
        ProjectCommand::List { page, page_size } => {
            let rows = services
                .projects
                .list_projects(PageRequest::new(*page, *page_size))
                .await?
                .map(|p| ProjectRow::from(&p));
            output::print_list(&rows.items, format);
            if format == OutputFormat::Table && rows.total_pages > 1 {
                println!(
                    "Page {} of {} ({} projects)",
                    rows.page, rows.total_pages, rows.total_items
                );
            }
        }
        ProjectCommand::Delete { uuid, force } => {
            let project = services.projects.get_project(uuid).await?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete project '{}' and every scan recorded for it?",
                        project.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let scans = services.projects.delete_project(uuid).await?;
            output::print_success(&format!(
                "Project '{}' deleted ({scans} scans removed)",
                project.name
            ));
        }
    }

    services.pool.close().await;
    Ok(())
}

fn print_project(project: &Project) {
    output::print_kv("Name", &project.name);
    output::print_kv("Version", project.version.as_deref().unwrap_or("-"));
    output::print_kv("Description", project.description.as_deref().unwrap_or("-"));
}
