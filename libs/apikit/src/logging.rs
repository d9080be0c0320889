//! Logging sink setup: console and/or rolling file, level from config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rolling file sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Directory log files are written to (created if absent).
    pub dir: PathBuf,
    /// File name prefix; daily rotation appends the date.
    pub prefix: String,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            prefix: "apikit".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level or full `EnvFilter` directive string
    /// (e.g. `"info"` or `"info,hyper=warn"`). `RUST_LOG` wins when set.
    pub level: String,
    pub console: bool,
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            file: None,
        }
    }
}

/// Install the global tracing subscriber for this process.
///
/// Returns the worker guard of the non-blocking file writer, if file logging
/// is enabled; the caller must keep it alive for buffered records to flush.
///
/// # Errors
/// Returns an error if the filter directive is invalid, the log directory
/// cannot be created, or a global subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cfg.level))?;

    let console_layer = cfg.console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
    });

    let (file_layer, guard) = match &cfg.file {
        Some(file_cfg) => {
            std::fs::create_dir_all(&file_cfg.dir)?;
            let appender = tracing_appender::rolling::daily(
                &file_cfg.dir,
                format!("{}.log", file_cfg.prefix),
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_console_info() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.level, "info");
        assert!(cfg.console);
        assert!(cfg.file.is_none());
    }

    #[test]
    fn level_accepts_env_filter_directives() {
        assert!(EnvFilter::try_new("info,hyper=warn,tower_http=debug").is_ok());
        assert!(EnvFilter::try_new("not a directive!!").is_err());
    }

    #[test]
    fn file_config_round_trips_through_serde() {
        let cfg: LoggingConfig = serde_json::from_value(serde_json::json!({
            "level": "debug",
            "console": false,
            "file": { "dir": "/tmp/apikit-logs", "prefix": "svc" }
        }))
        .unwrap();
        assert_eq!(cfg.level, "debug");
        assert!(!cfg.console);
        assert_eq!(cfg.file.unwrap().prefix, "svc");
    }
}
