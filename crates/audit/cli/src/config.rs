//! Configuration for auditctl

use audit_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zkp_verification::ZkpConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger behaviour
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Proof pipeline switches
    #[serde(default)]
    pub zkp: ZkpConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON-lines log per collection
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("audit-data")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl AppConfig {
    /// Layer defaults, an optional file, then `AUDIT_`-prefixed environment variables.
    ///
    /// Nested keys use a double underscore: `AUDIT_LEDGER__RETENTION_DAYS=30`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AUDIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.dir, PathBuf::from("audit-data"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.ledger.max_log_size, 10_000);
        assert!(config.zkp.enable_proof_generation);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.ledger.retention_days, 90);
        assert!(config.ledger.central_endpoint.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[ledger]
retention_days = 30
max_log_size = 500

[storage]
dir = "/var/lib/audit"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.ledger.retention_days, 30);
        assert_eq!(config.ledger.max_log_size, 500);
        assert!(config.ledger.enable_crypto_verification);
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/audit"));
    }
}
