//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration for the GigID node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GigidConfig {
    /// Administrator settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// The administrator address, `0x`-prefixed hex. The node refuses to
    /// start without one.
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9100
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GigidConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: GigidConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GigidConfig::default();
        assert_eq!(config.api.port, 9100);
        assert_eq!(config.logging.level, "info");
        assert!(config.admin.address.is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = GigidConfig::default();
        config.admin.address = "0x00000000000000000000000000000000000000aa".into();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: GigidConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.api.port, config.api.port);
        assert_eq!(decoded.admin.address, config.admin.address);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = GigidConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api.port, 9100);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[admin]
address = "0x00000000000000000000000000000000000000aa"

[api]
port = 8001
"#;
        let config: GigidConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.port, 8001);
        // Defaults for unspecified
        assert_eq!(config.api.listen_addr, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
    }
}
