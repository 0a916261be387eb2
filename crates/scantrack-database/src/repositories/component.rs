//! Component repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use scantrack_core::error::{AppError, ErrorKind};
use scantrack_core::result::AppResult;
use scantrack_core::types::ComponentUuid;
use scantrack_entity::component::{Component, CreateComponent};

use super::violates;
use crate::store::ComponentStore;

/// Repository for component rows.
#[derive(Debug, Clone)]
pub struct ComponentRepository {
    pool: PgPool,
}

impl ComponentRepository {
    /// Create a new component repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComponentStore for ComponentRepository {
    async fn create_component(&self, data: &CreateComponent) -> AppResult<Component> {
        let uuid = ComponentUuid::new();
        sqlx::query_as::<_, Component>(
            "INSERT INTO component (uuid, group_name, name, version, purl) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, uuid, group_name, name, version, purl",
        )
        .bind(uuid)
        .bind(&data.group)
        .bind(&data.name)
        .bind(&data.version)
        .bind(&data.purl)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "component_uuid_idx") {
                AppError::conflict(format!("Component {uuid} already exists"))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create component", e)
            }
        })
    }

    async fn find_component(&self, uuid: &ComponentUuid) -> AppResult<Option<Component>> {
        sqlx::query_as::<_, Component>(
            "SELECT id, uuid, group_name, name, version, purl FROM component WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find component", e))
    }
}
