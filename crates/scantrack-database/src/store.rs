//! Store traits for projects, components and scans.
//!
//! Services depend on these traits rather than on a concrete backend. The
//! PostgreSQL repositories and [`crate::MemoryStore`] implement them with
//! the same error contract:
//!
//! - an unknown project, component or scan uuid yields `NotFound`;
//! - a duplicate uuid yields `Conflict`;
//! - any other backend failure yields `Database`.

use async_trait::async_trait;

use scantrack_core::result::AppResult;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_entity::component::{Component, CreateComponent};
use scantrack_entity::project::{CreateProject, Project, UpdateProject};
use scantrack_entity::scan::{CreateScan, ScanRecord};

/// Persistence for projects.
#[async_trait]
pub trait ProjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a project under a fresh uuid.
    async fn create_project(&self, data: &CreateProject) -> AppResult<Project>;

    /// Look a project up by uuid.
    async fn find_project(&self, uuid: &ProjectUuid) -> AppResult<Option<Project>>;

    /// List projects ordered by name.
    async fn list_projects(&self, page: &PageRequest) -> AppResult<PageResponse<Project>>;

    /// Change a project's name, version or description. Returns `None` if
    /// no project has that uuid.
    async fn update_project(
        &self,
        uuid: &ProjectUuid,
        data: &UpdateProject,
    ) -> AppResult<Option<Project>>;

    /// Delete a project and, through ownership, all of its scans.
    ///
    /// Returns the number of scans removed with it, counted atomically with
    /// the delete, or `None` if the project did not exist.
    async fn delete_project(&self, uuid: &ProjectUuid) -> AppResult<Option<u64>>;
}

/// Persistence for components.
#[async_trait]
pub trait ComponentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a component under a fresh uuid.
    async fn create_component(&self, data: &CreateComponent) -> AppResult<Component>;

    /// Look a component up by uuid.
    async fn find_component(&self, uuid: &ComponentUuid) -> AppResult<Option<Component>>;
}

/// Persistence for scans and their component membership.
#[async_trait]
pub trait ScanStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a scan with its initial components and return the stored record.
    async fn create(&self, data: &CreateScan) -> AppResult<ScanRecord>;

    /// Look a scan up by uuid.
    async fn find_by_uuid(&self, uuid: &ScanUuid) -> AppResult<Option<ScanRecord>>;

    /// Scans of a project, most recently imported first.
    async fn find_by_project(
        &self,
        project: &ProjectUuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScanRecord>>;

    /// Number of scans owned by a project.
    async fn count_by_project(&self, project: &ProjectUuid) -> AppResult<u64>;

    /// Associate components with a scan. Already-associated components are
    /// left alone.
    async fn add_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord>;

    /// Dissociate components from a scan. Components that were not
    /// associated are ignored.
    async fn remove_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord>;

    /// Replace the whole component membership of a scan.
    async fn replace_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord>;

    /// Delete a scan. Returns `true` if it existed.
    async fn delete(&self, uuid: &ScanUuid) -> AppResult<bool>;

    /// Delete every scan of a project. Returns the number removed.
    async fn delete_by_project(&self, project: &ProjectUuid) -> AppResult<u64>;
}
