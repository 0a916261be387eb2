//! The scan aggregate: a scan row joined with its project and components.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scantrack_core::error::AppError;
use scantrack_core::result::AppResult;
use scantrack_core::types::{ComponentUuid, ScanUuid};

use super::document::ScanDocument;
use super::model::Scan;
use crate::component::Component;
use crate::project::Project;

/// One scan event with its owning project and associated components.
///
/// The component list is kept sorted by ascending component identity and
/// never holds the same component twice. Callers only get a read-only view
/// of it; membership changes go through [`ScanRecord::add_component`],
/// [`ScanRecord::remove_component`] and [`ScanRecord::set_components`].
///
/// Serialization goes through [`ScanDocument`], so the numeric identity is
/// never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ScanDocument")]
pub struct ScanRecord {
    id: i64,
    uuid: ScanUuid,
    executed: DateTime<Utc>,
    imported: DateTime<Utc>,
    project: Project,
    components: Vec<Component>,
}

impl ScanRecord {
    /// Build an unsaved record. Its identity reads as zero until the
    /// storage layer calls [`ScanRecord::assign_id`].
    pub fn new(
        uuid: ScanUuid,
        executed: DateTime<Utc>,
        imported: DateTime<Utc>,
        project: Project,
        components: Vec<Component>,
    ) -> Self {
        let mut record = Self {
            id: 0,
            uuid,
            executed,
            imported,
            project,
            components: Vec::new(),
        };
        record.set_components(components);
        record
    }

    /// Assemble a persisted record from its row and loaded relations.
    pub fn from_parts(scan: Scan, project: Project, components: Vec<Component>) -> Self {
        let mut record = Self::new(scan.uuid, scan.executed, scan.imported, project, components);
        record.id = scan.id;
        record
    }

    /// Storage-assigned identity, zero before the first insert.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Record the identity assigned by the storage layer. Only allowed once.
    pub fn assign_id(&mut self, id: i64) -> AppResult<()> {
        if id <= 0 {
            return Err(AppError::validation(format!(
                "Scan identity must be positive, got {id}"
            )));
        }
        if self.id != 0 {
            return Err(AppError::conflict(format!(
                "Scan {} already has identity {}",
                self.uuid, self.id
            )));
        }
        self.id = id;
        Ok(())
    }

    /// External identifier.
    pub fn uuid(&self) -> ScanUuid {
        self.uuid
    }

    /// When the scan ran.
    pub fn executed(&self) -> DateTime<Utc> {
        self.executed
    }

    /// Change the execution time. No ordering against `imported` is enforced.
    pub fn set_executed(&mut self, executed: DateTime<Utc>) {
        self.executed = executed;
    }

    /// When the scan results were imported.
    pub fn imported(&self) -> DateTime<Utc> {
        self.imported
    }

    /// Change the import time. No ordering against `executed` is enforced.
    pub fn set_imported(&mut self, imported: DateTime<Utc>) {
        self.imported = imported;
    }

    /// Whether the recorded import time precedes the execution time.
    pub fn imported_before_executed(&self) -> bool {
        self.imported < self.executed
    }

    /// Owning project.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Replace the owning project reference.
    pub fn set_project(&mut self, project: Project) {
        self.project = project;
    }

    /// Associated components in ascending identity order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Replace the component membership.
    ///
    /// Components are identified by uuid. Unsaved components all share
    /// identity zero, so the uuid also breaks ordering ties.
    pub fn set_components(&mut self, mut components: Vec<Component>) {
        components.sort_by_key(ordering_key);
        let mut seen = HashSet::with_capacity(components.len());
        components.retain(|c| seen.insert(c.uuid));
        self.components = components;
    }

    /// Insert a component at its ordered position. Returns `false` if it
    /// was already associated.
    pub fn add_component(&mut self, component: Component) -> bool {
        if self.contains_component(&component.uuid) {
            return false;
        }
        let pos = self
            .components
            .binary_search_by_key(&ordering_key(&component), ordering_key)
            .unwrap_or_else(|pos| pos);
        self.components.insert(pos, component);
        true
    }

    /// Drop a component by uuid. Returns whether one was removed.
    pub fn remove_component(&mut self, uuid: &ComponentUuid) -> bool {
        let before = self.components.len();
        self.components.retain(|c| &c.uuid != uuid);
        self.components.len() != before
    }

    /// Whether a component is associated with this scan.
    pub fn contains_component(&self, uuid: &ComponentUuid) -> bool {
        self.components.iter().any(|c| &c.uuid == uuid)
    }
}

fn ordering_key(component: &Component) -> (i64, ComponentUuid) {
    (component.id, component.uuid)
}
