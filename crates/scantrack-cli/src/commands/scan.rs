//! Scan import and inspection commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use scantrack_core::config::AppConfig;
use scantrack_core::error::{AppError, ErrorKind};
use scantrack_core::types::pagination::PageRequest;
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_entity::component::Component;
use scantrack_entity::scan::{ImportScan, ScanDocument, ScanRecord};

/// Arguments for scan commands
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Scan subcommand
    #[command(subcommand)]
    pub command: ScanCommand,
}

/// Scan subcommands
#[derive(Debug, Subcommand)]
pub enum ScanCommand {
    /// Import a scan from a JSON document
    Import {
        /// Path to the scan document
        #[arg(short, long)]
        file: PathBuf,
        /// Owning project, overriding the one in the document
        #[arg(short, long)]
        project: Option<ProjectUuid>,
    },
    /// Show a scan and its components
    Show {
        /// Scan uuid
        uuid: ScanUuid,
    },
    /// List the scans of a project, newest import first
    List {
        /// Project uuid
        project: ProjectUuid,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Items per page (configured default when omitted)
        #[arg(long)]
        page_size: Option<u64>,
    },
    /// Associate components with a scan
    AddComponents {
        /// Scan uuid
        scan: ScanUuid,
        /// Component uuids
        #[arg(required = true)]
        components: Vec<ComponentUuid>,
    },
    /// Dissociate components from a scan
    RemoveComponents {
        /// Scan uuid
        scan: ScanUuid,
        /// Component uuids
        #[arg(required = true)]
        components: Vec<ComponentUuid>,
    },
    /// Replace the whole component membership of a scan
    ReplaceComponents {
        /// Scan uuid
        scan: ScanUuid,
        /// Component uuids; none clears the membership
        components: Vec<ComponentUuid>,
    },
    /// Delete a scan
    Delete {
        /// Scan uuid
        uuid: ScanUuid,
    },
}

/// Scan display row
#[derive(Debug, Serialize, Tabled)]
struct ScanRow {
    /// Scan uuid
    uuid: String,
    /// Executed at
    executed: String,
    /// Imported at
    imported: String,
    /// Component count
    components: usize,
}

impl From<&ScanRecord> for ScanRow {
    fn from(s: &ScanRecord) -> Self {
        Self {
            uuid: s.uuid().to_string(),
            executed: s.executed().format("%Y-%m-%d %H:%M:%S").to_string(),
            imported: s.imported().format("%Y-%m-%d %H:%M:%S").to_string(),
            components: s.components().len(),
        }
    }
}

/// Component display row
#[derive(Debug, Serialize, Tabled)]
struct ComponentRow {
    /// Component uuid
    uuid: String,
    /// Coordinates
    coordinates: String,
}

impl From<&Component> for ComponentRow {
    fn from(c: &Component) -> Self {
        Self {
            uuid: c.uuid.to_string(),
            coordinates: c.coordinates(),
        }
    }
}

/// Execute scan commands
pub async fn execute(
    args: &ScanArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect(config).await?;

    match &args.command {
        ScanCommand::Import { file, project } => {
            let mut request = read_import(file).await?;
            if project.is_some() {
                request.project = *project;
            }

            let scan = services.scans.import_scan(request).await?;
            match format {
                OutputFormat::Json => print_scan(&scan, format),
                OutputFormat::Table => output::print_success(&format!(
                    "Scan {} imported into '{}' with {} components",
                    scan.uuid(),
                    scan.project().name,
                    scan.components().len()
                )),
            }
        }
        ScanCommand::Show { uuid } => match format {
            OutputFormat::Json => {
                let document = services.scans.export_scan(uuid).await?;
                output::print_item(&document, format);
            }
            OutputFormat::Table => {
                let scan = services.scans.get_scan(uuid).await?;
                print_scan(&scan, format);
            }
        },
        ScanCommand::List {
            project,
            page,
            page_size,
        } => {
            let size = page_size.unwrap_or(config.scan.default_page_size);
            let scans = services
                .scans
                .list_scans(project, Some(PageRequest::new(*page, size)))
                .await?;
            let rows = scans.map(|s| ScanRow::from(&s));
            output::print_list(&rows.items, format);
            if format == OutputFormat::Table && rows.total_pages > 1 {
                println!(
                    "Page {} of {} ({} scans)",
                    rows.page, rows.total_pages, rows.total_items
                );
            }
        }
        ScanCommand::AddComponents { scan, components } => {
            let scan = services.scans.add_components(scan, components).await?;
            print_membership(&scan, format);
        }
        ScanCommand::RemoveComponents { scan, components } => {
            let scan = services.scans.remove_components(scan, components).await?;
            print_membership(&scan, format);
        }
        ScanCommand::ReplaceComponents { scan, components } => {
            let scan = services.scans.replace_components(scan, components).await?;
            print_membership(&scan, format);
        }
        ScanCommand::Delete { uuid } => {
            services.scans.delete_scan(uuid).await?;
            output::print_success(&format!("Scan {uuid} deleted"));
        }
    }

    services.pool.close().await;
    Ok(())
}

/// Read and parse an import document.
async fn read_import(path: &Path) -> Result<ImportScan, AppError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to read {}", path.display()),
            e,
        )
    })?;
    serde_json::from_str(&text).map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("{} is not a valid scan document: {e}", path.display()),
            e,
        )
    })
}

fn print_scan(scan: &ScanRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_item(&ScanDocument::from(scan.clone()), format),
        OutputFormat::Table => {
            output::print_kv("UUID", &scan.uuid().to_string());
            output::print_kv(
                "Project",
                &format!("{} ({})", scan.project().name, scan.project().uuid),
            );
            output::print_kv("Executed", &scan.executed().to_rfc3339());
            output::print_kv("Imported", &scan.imported().to_rfc3339());
            if scan.imported_before_executed() {
                output::print_warning("Import time precedes execution time");
            }
            println!();
            let rows: Vec<ComponentRow> = scan.components().iter().map(ComponentRow::from).collect();
            output::print_list(&rows, format);
        }
    }
}

fn print_membership(scan: &ScanRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_scan(scan, format),
        OutputFormat::Table => output::print_success(&format!(
            "Scan {} now has {} components",
            scan.uuid(),
            scan.components().len()
        )),
    }
}
