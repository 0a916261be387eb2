//! Component entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use scantrack_core::types::ComponentUuid;

/// A software dependency identified by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Component {
    /// Storage-assigned identity; scan component lists are ordered by it.
    #[serde(skip)]
    pub id: i64,
    /// External identifier.
    pub uuid: ComponentUuid,
    /// Namespace or group (Maven group id, npm scope, ...).
    #[sqlx(rename = "group_name")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Component name.
    pub name: String,
    /// Component version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Package URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

impl Component {
    /// `group:name:version` style coordinates for display.
    pub fn coordinates(&self) -> String {
        let mut out = String::new();
        if let Some(group) = &self.group {
            out.push_str(group);
            out.push(':');
        }
        out.push_str(&self.name);
        if let Some(version) = &self.version {
            out.push(':');
            out.push_str(version);
        }
        out
    }
}

/// Data required to create a new component.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateComponent {
    /// Namespace or group.
    #[validate(length(max = 255))]
    pub group: Option<String>,
    /// Component name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Component version.
    #[validate(length(max = 255))]
    pub version: Option<String>,
    /// Package URL.
    #[validate(length(max = 1024))]
    pub purl: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates() {
        let component = Component {
            id: 1,
            uuid: ComponentUuid::new(),
            group: Some("org.apache.commons".to_string()),
            name: "commons-text".to_string(),
            version: Some("1.10.0".to_string()),
            purl: None,
        };
        assert_eq!(component.coordinates(), "org.apache.commons:commons-text:1.10.0");
    }

    #[test]
    fn test_coordinates_without_group() {
        let component = Component {
            id: 2,
            uuid: ComponentUuid::new(),
            group: None,
            name: "left-pad".to_string(),
            version: None,
            purl: None,
        };
        assert_eq!(component.coordinates(), "left-pad");
    }
}
