//! External representation of a scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scantrack_core::types::ScanUuid;

use super::record::ScanRecord;
use crate::component::Component;
use crate::project::Project;

/// The serialized shape of a scan.
///
/// Absent values are omitted rather than written as `null`. The numeric
/// identity is not part of this shape at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanDocument {
    /// When the scan ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed: Option<DateTime<Utc>>,
    /// When the scan results were imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported: Option<DateTime<Utc>>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    /// Associated components in ascending identity order.
    #[serde(default)]
    pub components: Vec<Component>,
    /// External identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<ScanUuid>,
}

impl From<ScanRecord> for ScanDocument {
    fn from(record: ScanRecord) -> Self {
        Self {
            executed: Some(record.executed()),
            imported: Some(record.imported()),
            project: Some(record.project().clone()),
            components: record.components().to_vec(),
            uuid: Some(record.uuid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_imported_is_omitted() {
        let doc = ScanDocument {
            executed: Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap()),
            imported: None,
            project: None,
            components: Vec::new(),
            uuid: Some(ScanUuid::new()),
        };
        let json = serde_json::to_value(&doc).expect("serialize");
        let obj = json.as_object().expect("object");

        assert!(!obj.contains_key("imported"));
        assert!(!obj.contains_key("project"));
        assert!(obj.contains_key("executed"));
        assert!(obj.contains_key("uuid"));
        assert!(!json.to_string().contains("null"));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let uuid = ScanUuid::new();
        let json = format!(r#"{{"uuid":"{uuid}","executed":"2024-05-02T08:30:00Z"}}"#);
        let doc: ScanDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(doc.uuid, Some(uuid));
        assert!(doc.imported.is_none());
        assert!(doc.components.is_empty());
    }
}
