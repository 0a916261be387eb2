//! Project entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use scantrack_core::types::ProjectUuid;

/// The codebase or application a scan was run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Storage-assigned identity.
    #[serde(skip)]
    pub id: i64,
    /// External identifier.
    pub uuid: ProjectUuid,
    /// Project name.
    pub name: String,
    /// Project version, if tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Data required to create a new project.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProject {
    /// Project name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Project version.
    #[validate(length(max = 255))]
    pub version: Option<String>,
    /// Free-form description.
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Data for editing an existing project. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProject {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New version.
    #[validate(length(max = 255))]
    pub version: Option<String>,
    /// New description.
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

impl UpdateProject {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none() && self.description.is_none()
    }

    /// Apply the set fields to `project`.
    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(version) = &self.version {
            project.version = Some(version.clone());
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_input;

    #[test]
    fn test_internal_id_is_not_serialized() {
        let project = Project {
            id: 42,
            uuid: ProjectUuid::new(),
            name: "billing".to_string(),
            version: None,
            description: None,
        };
        let json = serde_json::to_value(&project).expect("serialize");
        assert!(json.get("id").is_none());
        assert!(json.get("version").is_none());
        assert_eq!(json["name"], "billing");
    }

    #[test]
    fn test_create_project_requires_name() {
        let input = CreateProject {
            name: String::new(),
            version: Some("1.0".to_string()),
            description: None,
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_update_project_applies_only_set_fields() {
        let mut project = Project {
            id: 1,
            uuid: ProjectUuid::new(),
            name: "billing".to_string(),
            version: Some("1.0".to_string()),
            description: Some("invoices".to_string()),
        };
        let update = UpdateProject {
            version: Some("1.1".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut project);

        assert_eq!(project.name, "billing");
        assert_eq!(project.version.as_deref(), Some("1.1"));
        assert_eq!(project.description.as_deref(), Some("invoices"));
        assert!(UpdateProject::default().is_empty());
    }

    #[test]
    fn test_update_project_rejects_empty_name() {
        let update = UpdateProject {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_input(&update).is_err());
    }
}
