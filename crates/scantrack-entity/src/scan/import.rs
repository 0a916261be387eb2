//! Scan import input and its validation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scantrack_core::error::AppError;
use scantrack_core::result::AppResult;
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};

use super::model::CreateScan;

/// A scan as submitted for import, typically parsed from JSON.
///
/// Every field is optional at this stage; [`ImportScan::into_create`] turns
/// it into a [`CreateScan`] or reports what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportScan {
    /// Pre-assigned uuid; a random one is generated when absent.
    #[serde(default)]
    pub uuid: Option<ScanUuid>,
    /// When the scan ran. Required.
    #[serde(default)]
    pub executed: Option<DateTime<Utc>>,
    /// When the results were imported. Defaults to the import time.
    #[serde(default)]
    pub imported: Option<DateTime<Utc>>,
    /// Owning project. Required.
    #[serde(default)]
    pub project: Option<ProjectUuid>,
    /// Components discovered by the scan.
    #[serde(default)]
    pub components: Vec<ComponentUuid>,
}

impl ImportScan {
    /// Validate and fill defaults, using `now` as the import time when none
    /// was supplied.
    pub fn into_create(self, now: DateTime<Utc>) -> AppResult<CreateScan> {
        let executed = self
            .executed
            .ok_or_else(|| AppError::validation("Scan is missing its execution timestamp"))?;
        let project = self
            .project
            .ok_or_else(|| AppError::validation("Scan is missing its owning project"))?;

        let mut seen = HashSet::with_capacity(self.components.len());
        let components = self
            .components
            .into_iter()
            .filter(|c| seen.insert(*c))
            .collect();

        Ok(CreateScan {
            uuid: self.uuid.unwrap_or_default(),
            executed,
            imported: self.imported.unwrap_or(now),
            project,
            components,
        })
    }
}
