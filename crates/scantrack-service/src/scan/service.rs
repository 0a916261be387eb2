//! Scan import and component membership.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use scantrack_core::config::ScanConfig;
use scantrack_core::error::AppError;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_database::store::ScanStore;
use scantrack_entity::scan::{ImportScan, ScanDocument, ScanRecord};

/// Records scan events and tracks the components each one found.
#[derive(Debug, Clone)]
pub struct ScanService {
    /// Scan store.
    scans: Arc<dyn ScanStore>,
    /// Import and listing settings.
    config: ScanConfig,
}

impl ScanService {
    /// Creates a new scan service.
    pub fn new(scans: Arc<dyn ScanStore>, config: ScanConfig) -> Self {
        Self { scans, config }
    }

    /// Imports a scan.
    ///
    /// The execution time and owning project are required. A missing import
    /// time becomes the current time and a missing uuid is generated.
    pub async fn import_scan(&self, req: ImportScan) -> Result<ScanRecord, AppError> {
        let data = req.into_create(Utc::now())?;

        if data.imported_before_executed() && self.config.warn_on_import_before_execute {
            warn!(
                scan = %data.uuid,
                executed = %data.executed,
                imported = %data.imported,
                "Scan claims it was imported before it executed"
            );
        }

        let record = self.scans.create(&data).await?;
        info!(
            scan = %record.uuid(),
            project = %record.project().uuid,
            components = record.components().len(),
            "Scan imported"
        );
        Ok(record)
    }

    /// Gets a scan by uuid.
    pub async fn get_scan(&self, uuid: &ScanUuid) -> Result<ScanRecord, AppError> {
        self.scans
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Scan {uuid} not found")))
    }

    /// Gets the external representation of a scan.
    pub async fn export_scan(&self, uuid: &ScanUuid) -> Result<ScanDocument, AppError> {
        self.get_scan(uuid).await.map(ScanDocument::from)
    }

    /// Lists a project's scans, newest import first. `None` uses the
    /// configured default page size.
    pub async fn list_scans(
        &self,
        project: &ProjectUuid,
        page: Option<PageRequest>,
    ) -> Result<PageResponse<ScanRecord>, AppError> {
        let page = page.unwrap_or_else(|| PageRequest::new(1, self.config.default_page_size));
        self.scans.find_by_project(project, &page).await
    }

    /// Associates components with a scan.
    pub async fn add_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> Result<ScanRecord, AppError> {
        let record = self.scans.add_components(scan, components).await?;
        info!(
            scan = %scan,
            added = components.len(),
            total = record.components().len(),
            "Scan components added"
        );
        Ok(record)
    }

    /// Dissociates components from a scan.
    pub async fn remove_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> Result<ScanRecord, AppError> {
        let record = self.scans.remove_components(scan, components).await?;
        info!(
            scan = %scan,
            removed = components.len(),
            total = record.components().len(),
            "Scan components removed"
        );
        Ok(record)
    }

    /// Replaces the component membership of a scan.
    pub async fn replace_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> Result<ScanRecord, AppError> {
        let record = self.scans.replace_components(scan, components).await?;
        info!(scan = %scan, total = record.components().len(), "Scan components replaced");
        Ok(record)
    }

    /// Deletes a scan.
    pub async fn delete_scan(&self, uuid: &ScanUuid) -> Result<(), AppError> {
        if !self.scans.delete(uuid).await? {
            return Err(AppError::not_found(format!("Scan {uuid} not found")));
        }
        info!(scan = %uuid, "Scan deleted");
        Ok(())
    }
}
