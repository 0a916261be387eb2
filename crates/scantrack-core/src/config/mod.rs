//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section falls back to its defaults when absent.

pub mod database;
pub mod logging;
pub mod scan;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::scan::ScanConfig;

use crate::error::AppError;

/// Environment variable selecting the overlay file `{env}.toml` that sits
/// next to the base configuration file.
pub const ENV_VAR: &str = "SCANTRACK_ENV";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scan import settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the given file with an environment-specific overlay
    /// (`{SCANTRACK_ENV}.toml` next to the given file) and environment
    /// variables prefixed with `SCANTRACK__` (e.g. `SCANTRACK__DATABASE__URL`).
    /// Every source is optional.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let profile = std::env::var(ENV_VAR).ok();
        Self::load_layers(path, profile.as_deref(), None)
    }

    /// Layered load with an explicit profile. `vars` replaces the process
    /// environment when given.
    fn load_layers(
        path: &str,
        profile: Option<&str>,
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Some(profile) = profile {
            let overlay = profile_path(path, profile);
            builder = builder.add_source(
                config::File::with_name(&overlay.to_string_lossy()).required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SCANTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

/// The profile overlay lives in the same directory as the base file.
fn profile_path(base: &str, profile: &str) -> PathBuf {
    Path::new(base)
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_apply_to_missing_sections() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[logging]\nformat = \"json\"").expect("write");

        let config = AppConfig::load(file.path().to_str().expect("utf-8 path")).expect("load");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.scan.default_page_size, 25);
        assert!(config.scan.warn_on_import_before_execute);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "[database]\nurl = \"postgres://u:p@db:5432/scans\"\nmax_connections = 3\n\n[scan]\ndefault_page_size = 50"
        )
        .expect("write");

        let config = AppConfig::load(file.path().to_str().expect("utf-8 path")).expect("load");
        assert_eq!(config.database.url, "postgres://u:p@db:5432/scans");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.scan.default_page_size, 50);
    }

    #[test]
    fn test_env_vars_override_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[scan]\ndefault_page_size = 50").expect("write");

        let vars = config::Map::from([
            ("SCANTRACK__SCAN__DEFAULT_PAGE_SIZE".to_string(), "40".to_string()),
            ("SCANTRACK__LOGGING__FORMAT".to_string(), "json".to_string()),
            ("OTHER__SCAN__DEFAULT_PAGE_SIZE".to_string(), "99".to_string()),
        ]);
        let config = AppConfig::load_layers(
            file.path().to_str().expect("utf-8 path"),
            None,
            Some(vars),
        )
        .expect("load");
        assert_eq!(config.scan.default_page_size, 40);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_profile_overlay_next_to_base_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[scan]\ndefault_page_size = 50\n\n[logging]\nlevel = \"debug\"",
        )
        .expect("write base");
        std::fs::write(
            dir.path().join("production.toml"),
            "[scan]\ndefault_page_size = 10",
        )
        .expect("write overlay");

        let base = dir.path().join("default.toml");
        let config = AppConfig::load_layers(
            base.to_str().expect("utf-8 path"),
            Some("production"),
            Some(config::Map::new()),
        )
        .expect("load");
        assert_eq!(config.scan.default_page_size, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_profile_path_resolves_against_base_dir() {
        assert_eq!(
            profile_path("config/default.toml", "staging"),
            PathBuf::from("config/staging")
        );
        assert_eq!(profile_path("default.toml", "staging"), PathBuf::from("staging"));
    }
}
