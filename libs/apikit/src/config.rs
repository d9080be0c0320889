//! Layered application configuration.
//!
//! Explicit structs constructed once at startup and passed by reference into
//! the components that need them. Precedence: defaults → YAML file (if
//! provided) → environment (`APIKIT__*`, `__` as the section separator).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Configuration error for startup-time loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    FileNotFound(PathBuf),
    #[error(transparent)]
    Invalid(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load layered configuration, falling back to defaults for anything not
    /// set by the file or the environment.
    ///
    /// # Errors
    /// Returns an error if the file path does not exist or any layer fails to
    /// parse or merge.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed("APIKIT__").split("__"));
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::load_or_default(None).unwrap();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8087");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.console);
        assert!(cfg.logging.file.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load_or_default(Some(Path::new("/nonexistent/app.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            f,
            "server:\n  bind_addr: 0.0.0.0:9000\nlogging:\n  level: debug"
        )
        .unwrap();
        let cfg = AppConfig::load_or_default(Some(f.path())).unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.logging.level, "debug");
        // Untouched sections keep their defaults.
        assert!(cfg.logging.console);
    }
}
