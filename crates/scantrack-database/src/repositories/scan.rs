//! Scan repository implementation.
//!
//! A scan row references its project through `project_id` and its
//! components through the `scan_component` join table. Components are
//! always loaded in ascending `component.id` order.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use scantrack_core::error::{AppError, ErrorKind};
use scantrack_core::result::AppResult;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_entity::component::Component;
use scantrack_entity::project::Project;
use scantrack_entity::scan::{CreateScan, Scan, ScanRecord};

use super::{violates, violates_foreign_key};
use crate::store::ScanStore;

/// Repository for scans and their component membership.
#[derive(Debug, Clone)]
pub struct ScanRepository {
    pool: PgPool,
}

impl ScanRepository {
    /// Create a new scan repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e))
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
    }

    /// Apply a membership change to a locked scan row and return the result.
    async fn modify_components(
        &self,
        uuid: &ScanUuid,
        components: &[ComponentUuid],
        change: MembershipChange,
    ) -> AppResult<ScanRecord> {
        let mut tx = self.begin().await?;

        let scan = sqlx::query_as::<_, Scan>("SELECT * FROM scan WHERE name = $1 FOR UPDATE")
            .bind(uuid)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock scan", e))?
            .ok_or_else(|| AppError::not_found(format!("Scan {uuid} not found")))?;

        let strict = !matches!(change, MembershipChange::Remove);
        let component_ids = resolve_component_ids(&mut tx, components, strict).await?;

        if matches!(change, MembershipChange::Replace) {
            sqlx::query("DELETE FROM scan_component WHERE scan_id = $1")
                .bind(scan.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to clear scan components", e)
                })?;
        }

        match change {
            MembershipChange::Add | MembershipChange::Replace => {
                link_components(&mut tx, scan.id, &component_ids).await?;
            }
            MembershipChange::Remove => {
                sqlx::query(
                    "DELETE FROM scan_component WHERE scan_id = $1 AND component_id = ANY($2)",
                )
                .bind(scan.id)
                .bind(&component_ids)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to unlink components", e)
                })?;
            }
        }

        let record = load_record(&mut tx, scan).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        debug!(
            scan = %uuid,
            change = ?change,
            requested = components.len(),
            components = record.components().len(),
            "Updated scan components"
        );
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy)]
enum MembershipChange {
    Add,
    Remove,
    Replace,
}

/// Resolve a project uuid to its row, failing with `NotFound`.
async fn find_project(conn: &mut PgConnection, uuid: &ProjectUuid) -> AppResult<Project> {
    sqlx::query_as::<_, Project>(
        "SELECT id, uuid, name, version, description FROM project WHERE uuid = $1",
    )
    .bind(uuid)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))?
    .ok_or_else(|| AppError::not_found(format!("Project {uuid} not found")))
}

/// Map component uuids to identities, preserving the caller's order.
///
/// With `strict`, an unknown uuid fails with `NotFound`; otherwise it is
/// skipped.
async fn resolve_component_ids(
    conn: &mut PgConnection,
    uuids: &[ComponentUuid],
    strict: bool,
) -> AppResult<Vec<i64>> {
    if uuids.is_empty() {
        return Ok(Vec::new());
    }

    let text: Vec<String> = uuids.iter().map(ToString::to_string).collect();
    let rows = sqlx::query_as::<_, (i64, ComponentUuid)>(
        "SELECT id, uuid FROM component WHERE uuid = ANY($1)",
    )
    .bind(&text)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve components", e))?;

    let known: HashMap<ComponentUuid, i64> = rows.into_iter().map(|(id, uuid)| (uuid, id)).collect();
    let mut ids = Vec::with_capacity(uuids.len());
    for uuid in uuids {
        match known.get(uuid) {
            Some(id) => ids.push(*id),
            None if strict => {
                return Err(AppError::not_found(format!("Component {uuid} not found")));
            }
            None => {}
        }
    }
    Ok(ids)
}

async fn link_components(conn: &mut PgConnection, scan_id: i64, component_ids: &[i64]) -> AppResult<()> {
    if component_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO scan_component (scan_id, component_id) \
         SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(scan_id)
    .bind(component_ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if violates_foreign_key(&e) {
            AppError::not_found("A component was deleted while being linked")
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to link components", e)
        }
    })?;
    Ok(())
}

/// Translate a failed scan insert into the store error contract.
fn insert_error(err: sqlx::Error, data: &CreateScan) -> AppError {
    if violates(&err, "scan_uuid_idx") {
        AppError::conflict(format!("Scan {} already exists", data.uuid))
    } else if violates_foreign_key(&err) {
        AppError::not_found(format!("Project {} not found", data.project))
    } else {
        AppError::with_source(ErrorKind::Database, "Failed to create scan", err)
    }
}

async fn load_components(conn: &mut PgConnection, scan_id: i64) -> AppResult<Vec<Component>> {
    sqlx::query_as::<_, Component>(
        "SELECT c.id, c.uuid, c.group_name, c.name, c.version, c.purl \
         FROM component c \
         INNER JOIN scan_component sc ON sc.component_id = c.id \
         WHERE sc.scan_id = $1 \
         ORDER BY c.id ASC",
    )
    .bind(scan_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load scan components", e))
}

/// Load the project and components of a scan row.
async fn load_record(conn: &mut PgConnection, scan: Scan) -> AppResult<ScanRecord> {
    let project = sqlx::query_as::<_, Project>(
        "SELECT id, uuid, name, version, description FROM project WHERE id = $1",
    )
    .bind(scan.project_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load scan project", e))?;
    let components = load_components(conn, scan.id).await?;
    Ok(ScanRecord::from_parts(scan, project, components))
}

#[async_trait]
impl ScanStore for ScanRepository {
    async fn create(&self, data: &CreateScan) -> AppResult<ScanRecord> {
        let mut tx = self.begin().await?;

        let project = find_project(&mut tx, &data.project).await?;
        let component_ids = resolve_component_ids(&mut tx, &data.components, true).await?;

        let scan = sqlx::query_as::<_, Scan>(
            "INSERT INTO scan (executed, imported, project_id, name) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.executed)
        .bind(data.imported)
        .bind(project.id)
        .bind(data.uuid)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| insert_error(e, data))?;

        link_components(&mut tx, scan.id, &component_ids).await?;
        let components = load_components(&mut tx, scan.id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit scan", e))?;

        info!(
            scan = %data.uuid,
            project = %data.project,
            components = components.len(),
            "Created scan"
        );
        Ok(ScanRecord::from_parts(scan, project, components))
    }

    async fn find_by_uuid(&self, uuid: &ScanUuid) -> AppResult<Option<ScanRecord>> {
        let mut conn = self.acquire().await?;
        let scan = sqlx::query_as::<_, Scan>("SELECT * FROM scan WHERE name = $1")
            .bind(uuid)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find scan", e))?;

        match scan {
            Some(scan) => Ok(Some(load_record(&mut conn, scan).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_project(
        &self,
        project: &ProjectUuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScanRecord>> {
        let mut conn = self.acquire().await?;
        let owner = find_project(&mut conn, project).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scan WHERE project_id = $1")
            .bind(owner.id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count scans", e))?;

        let scans = sqlx::query_as::<_, Scan>(
            "SELECT * FROM scan WHERE project_id = $1 \
             ORDER BY imported DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner.id)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list scans", e))?;

        let mut records = Vec::with_capacity(scans.len());
        for scan in scans {
            let components = load_components(&mut conn, scan.id).await?;
            records.push(ScanRecord::from_parts(scan, owner.clone(), components));
        }

        Ok(PageResponse::new(
            records,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_by_project(&self, project: &ProjectUuid) -> AppResult<u64> {
        let mut conn = self.acquire().await?;
        let owner = find_project(&mut conn, project).await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scan WHERE project_id = $1")
            .bind(owner.id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count scans", e))?;
        Ok(total as u64)
    }

    async fn add_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        self.modify_components(scan, components, MembershipChange::Add)
            .await
    }

    async fn remove_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        self.modify_components(scan, components, MembershipChange::Remove)
            .await
    }

    async fn replace_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        self.modify_components(scan, components, MembershipChange::Replace)
            .await
    }

    async fn delete(&self, uuid: &ScanUuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM scan WHERE name = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete scan", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_project(&self, project: &ProjectUuid) -> AppResult<u64> {
        let mut conn = self.acquire().await?;
        let owner = find_project(&mut conn, project).await?;
        let result = sqlx::query("DELETE FROM scan WHERE project_id = $1")
            .bind(owner.id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete project scans", e)
            })?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::error::ErrorKind as DbErrorKind;

    use super::*;
    use crate::repositories::testing::db_error;

    fn create_scan() -> CreateScan {
        CreateScan {
            uuid: ScanUuid::new(),
            executed: Utc::now(),
            imported: Utc::now(),
            project: ProjectUuid::new(),
            components: Vec::new(),
        }
    }

    #[test]
    fn test_insert_error_duplicate_uuid_is_conflict() {
        let err = insert_error(
            db_error(DbErrorKind::UniqueViolation, Some("scan_uuid_idx")),
            &create_scan(),
        );
        assert!(err.is_kind(ErrorKind::Conflict));
    }

    #[test]
    fn test_insert_error_vanished_project_is_not_found() {
        let data = create_scan();
        let err = insert_error(
            db_error(DbErrorKind::ForeignKeyViolation, Some("scan_project_id_fkey")),
            &data,
        );
        assert!(err.is_kind(ErrorKind::NotFound));
        assert!(err.message.contains(&data.project.to_string()));
    }

    #[test]
    fn test_insert_error_other_failures_are_database() {
        let err = insert_error(sqlx::Error::PoolTimedOut, &create_scan());
        assert!(err.is_kind(ErrorKind::Database));
    }
}
