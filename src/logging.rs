//! Structured logging to a file via `tracing`.
//!
//! The terminal belongs to the TUI, so log output never goes to stdout or
//! stderr. Records are appended to one file with RFC 3339 UTC timestamps.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Environment variable holding a filter directive, e.g. `difftree=debug`.
pub const LOG_FILTER_ENV: &str = "DIFFTREE_LOG";
/// Environment variable overriding the log file path.
pub const LOG_FILE_ENV: &str = "DIFFTREE_LOG_FILE";

/// Resolve the log file path with precedence: CLI, `DIFFTREE_LOG_FILE`,
/// config file, platform default.
pub fn resolve_log_file_path(cli_file: Option<PathBuf>, config: &AppConfig) -> Option<PathBuf> {
    if let Some(p) = cli_file {
        if !p.as_os_str().is_empty() {
            return Some(p);
        }
    }
    if let Ok(env_path) = std::env::var(LOG_FILE_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }
    config.log_file()
}

/// Build the filter from `DIFFTREE_LOG`, falling back to the configured level.
fn build_env_filter(config: &AppConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(config.log_level()).map_err(|e| {
        AppError::InvalidInput(format!("bad log level {:?}: {}", config.log_level(), e))
    })
}

/// Initialize the logging system.
///
/// Installs nothing when logging is disabled or no log file path can be
/// determined. Returns the file being written to.
pub fn init_logging(config: &AppConfig, cli_file: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if !config.logging_enabled() {
        return Ok(None);
    }
    let Some(log_file) = resolve_log_file_path(cli_file, config) else {
        return Ok(None);
    };

    let filter = build_env_filter(config)?;

    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| AppError::Terminal(format!("failed to install logger: {}", e)))?;

    Ok(Some(log_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;

    fn config_with_file(file: Option<&str>) -> AppConfig {
        AppConfig {
            logging: LoggingConfig {
                file: file.map(String::from),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn cli_path_wins() {
        let cfg = config_with_file(Some("/from/config.log"));
        let path = resolve_log_file_path(Some(PathBuf::from("/from/cli.log")), &cfg);
        assert_eq!(path, Some(PathBuf::from("/from/cli.log")));
    }

    #[test]
    fn empty_cli_path_is_ignored() {
        let cfg = config_with_file(Some("/from/config.log"));
        let path = resolve_log_file_path(Some(PathBuf::new()), &cfg);
        // Either the env override or the config file, never the empty path.
        assert!(path.is_some_and(|p| !p.as_os_str().is_empty()));
    }

    #[test]
    fn bad_level_is_rejected() {
        let cfg = AppConfig {
            logging: LoggingConfig {
                level: Some("difftree=notalevel".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        if std::env::var(LOG_FILTER_ENV).is_err() {
            assert!(build_env_filter(&cfg).is_err());
        }
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("off.log");
        let cfg = AppConfig {
            logging: LoggingConfig {
                enabled: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(init_logging(&cfg, Some(file.clone())).unwrap(), None);
        assert!(!file.exists());
    }
}
