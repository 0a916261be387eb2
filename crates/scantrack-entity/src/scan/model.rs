//! Scan row model and creation input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};

/// One row of the `scan` table.
///
/// The uuid lives in the `name` column, which carries the unique index
/// `scan_uuid_idx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Scan {
    /// Storage-assigned identity.
    #[serde(skip)]
    pub id: i64,
    /// External identifier.
    #[sqlx(rename = "name")]
    pub uuid: ScanUuid,
    /// When the scan ran.
    pub executed: DateTime<Utc>,
    /// When the scan results were imported.
    pub imported: DateTime<Utc>,
    /// Owning project.
    #[serde(skip)]
    pub project_id: i64,
}

/// Validated data required to persist a new scan.
///
/// Produced by [`super::ImportScan::into_create`]; every required field is
/// already present by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateScan {
    /// External identifier of the new scan.
    pub uuid: ScanUuid,
    /// When the scan ran.
    pub executed: DateTime<Utc>,
    /// When the scan results were imported.
    pub imported: DateTime<Utc>,
    /// Owning project.
    pub project: ProjectUuid,
    /// Components discovered by the scan, without duplicates.
    pub components: Vec<ComponentUuid>,
}

impl CreateScan {
    /// Whether the claimed import time precedes the execution time.
    pub fn imported_before_executed(&self) -> bool {
        self.imported < self.executed
    }
}
