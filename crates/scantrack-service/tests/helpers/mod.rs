//! Shared test helpers for service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use scantrack_core::config::ScanConfig;
use scantrack_core::types::ComponentUuid;
use scantrack_database::MemoryStore;
use scantrack_entity::component::{Component, CreateComponent};
use scantrack_entity::project::{CreateProject, Project};
use scantrack_entity::scan::ImportScan;
use scantrack_service::{ComponentService, ProjectService, ScanService};

/// Services wired to one in-memory store.
pub struct TestApp {
    /// Project service.
    pub projects: ProjectService,
    /// Component service.
    pub components: ComponentService,
    /// Scan service.
    pub scans: ScanService,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            projects: ProjectService::new(store.clone()),
            components: ComponentService::new(store.clone()),
            scans: ScanService::new(store, ScanConfig::default()),
        }
    }

    /// Create a project with the given name.
    pub async fn create_project(&self, name: &str) -> Project {
        self.projects
            .create_project(CreateProject {
                name: name.to_string(),
                version: Some("1.0.0".to_string()),
                description: None,
            })
            .await
            .expect("Failed to create project")
    }

    /// Create a component with the given name.
    pub async fn create_component(&self, name: &str) -> Component {
        self.components
            .create_component(CreateComponent {
                group: Some("org.example".to_string()),
                name: name.to_string(),
                version: Some("2.0.0".to_string()),
                purl: Some(format!("pkg:maven/org.example/{name}@2.0.0")),
            })
            .await
            .expect("Failed to create component")
    }

    /// A complete import request for `project`.
    pub fn import_request(project: &Project, components: Vec<ComponentUuid>) -> ImportScan {
        let executed = executed_at();
        ImportScan {
            uuid: None,
            executed: Some(executed),
            imported: Some(executed + Duration::minutes(3)),
            project: Some(project.uuid),
            components,
        }
    }
}

/// Fixed execution timestamp used across tests.
pub fn executed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 15, 14, 30, 0).unwrap()
}
