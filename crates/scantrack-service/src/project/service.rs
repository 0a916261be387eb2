//! Project lifecycle operations.

use std::sync::Arc;

use tracing::info;

use scantrack_core::error::AppError;
use scantrack_core::types::ProjectUuid;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_database::store::ProjectStore;
use scantrack_entity::project::{CreateProject, Project, UpdateProject};
use scantrack_entity::validation::validate_input;

/// Manages projects, the owners of scans.
#[derive(Debug, Clone)]
pub struct ProjectService {
    /// Project store.
    projects: Arc<dyn ProjectStore>,
}

impl ProjectService {
    /// Creates a new project service.
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    /// Creates a project after validating its fields.
    pub async fn create_project(&self, req: CreateProject) -> Result<Project, AppError> {
        let req = CreateProject {
            name: req.name.trim().to_string(),
            ..req
        };
        validate_input(&req)?;

        let project = self.projects.create_project(&req).await?;
        info!(project = %project.uuid, name = %project.name, "Project created");
        Ok(project)
    }

    /// Gets a project by uuid.
    pub async fn get_project(&self, uuid: &ProjectUuid) -> Result<Project, AppError> {
        self.projects
            .find_project(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {uuid} not found")))
    }

    /// Lists projects.
    pub async fn list_projects(&self, page: PageRequest) -> Result<PageResponse<Project>, AppError> {
        self.projects.list_projects(&page).await
    }

    /// Edits a project's name, version or description.
    pub async fn update_project(
        &self,
        uuid: &ProjectUuid,
        req: UpdateProject,
    ) -> Result<Project, AppError> {
        let req = UpdateProject {
            name: req.name.map(|n| n.trim().to_string()),
            ..req
        };
        validate_input(&req)?;
        if req.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }

        let project = self
            .projects
            .update_project(uuid, &req)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {uuid} not found")))?;
        info!(project = %uuid, name = %project.name, "Project updated");
        Ok(project)
    }

    /// Deletes a project together with every scan it owns.
    ///
    /// Returns the number of scans that were removed along with it.
    pub async fn delete_project(&self, uuid: &ProjectUuid) -> Result<u64, AppError> {
        let scans = self
            .projects
            .delete_project(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {uuid} not found")))?;
        info!(project = %uuid, scans, "Project deleted");
        Ok(scans)
    }
}
