//! Scan import and listing configuration.

use serde::{Deserialize, Serialize};

/// Settings for scan import and listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Page size used when listing scans without an explicit size.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Emit a warning when an imported scan claims it was imported before it executed.
    #[serde(default = "default_true")]
    pub warn_on_import_before_execute: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            warn_on_import_before_execute: true,
        }
    }
}

fn default_page_size() -> u64 {
    25
}

fn default_true() -> bool {
    true
}
