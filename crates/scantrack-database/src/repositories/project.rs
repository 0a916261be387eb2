//! Project repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use scantrack_core::error::{AppError, ErrorKind};
use scantrack_core::result::AppResult;
use scantrack_core::types::ProjectUuid;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_entity::project::{CreateProject, Project, UpdateProject};

use super::violates;
use crate::store::ProjectStore;

const PROJECT_COLUMNS: &str = "id, uuid, name, version, description";

/// Repository for project rows.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn create_project(&self, data: &CreateProject) -> AppResult<Project> {
        let uuid = ProjectUuid::new();
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO project (uuid, name, version, description) \
             VALUES ($1, $2, $3, $4) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(uuid)
        .bind(&data.name)
        .bind(&data.version)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "project_uuid_idx") {
                AppError::conflict(format!("Project {uuid} already exists"))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create project", e)
            }
        })
    }

    async fn find_project(&self, uuid: &ProjectUuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project WHERE uuid = $1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    async fn list_projects(&self, page: &PageRequest) -> AppResult<PageResponse<Project>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count projects", e)
            })?;

        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))?;

        Ok(PageResponse::new(
            projects,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn update_project(
        &self,
        uuid: &ProjectUuid,
        data: &UpdateProject,
    ) -> AppResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "UPDATE project SET name = COALESCE($2, name), \
                                version = COALESCE($3, version), \
                                description = COALESCE($4, description) \
             WHERE uuid = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(uuid)
        .bind(&data.name)
        .bind(&data.version)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update project", e))?;

        if project.is_some() {
            info!(project = %uuid, "Updated project");
        }
        Ok(project)
    }

    async fn delete_project(&self, uuid: &ProjectUuid) -> AppResult<Option<u64>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // The row lock blocks concurrent scan inserts, which take a key-share
        // lock on the project, so the count matches what the cascade removes.
        let project_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM project WHERE uuid = $1 FOR UPDATE")
                .bind(uuid)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock project", e)
                })?;
        let Some(project_id) = project_id else {
            return Ok(None);
        };

        let scans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scan WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count scans", e))?;

        sqlx::query("DELETE FROM project WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete project", e)
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        info!(project = %uuid, scans, "Deleted project and its scans");
        Ok(Some(scans as u64))
    }
}
