//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--sort`, `--log-file`, `--no-watcher`, etc.)
//! 2. `--config <PATH>`
//! 3. `$DIFFTREE_CONFIG` environment variable (path to config file)
//! 4. Project-local `.difftree.toml` in the current working directory
//! 5. Global `~/.config/difftree/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diff::session::Settings;
use crate::diff::sort::SortMode;

// ── Section configs ──────────────────────────────────────────────────────────

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// File order: "name_asc", "name_desc", "ext_asc", "ext_desc".
    pub sort_by: Option<String>,
    /// Hide the tree when only one file changed.
    pub hide_when_single_change: Option<bool>,
    /// Merge chains of single-child folders into one row.
    pub collapse_folders: Option<bool>,
    /// Use nerd font icons (false = change markers only).
    pub use_icons: Option<bool>,
}

/// Panel layout settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the tree panel in terminal columns.
    pub panel_width: Option<u16>,
}

/// Input watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Reload when the input file changes.
    pub enabled: Option<bool>,
    /// Debounce interval in milliseconds.
    pub debounce_ms: Option<u64>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: Option<bool>,
    /// Filter directive, e.g. "info" or "difftree=debug".
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tree: TreeConfig,
    pub layout: LayoutConfig,
    pub watcher: WatcherConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default tree panel width in columns.
pub const DEFAULT_PANEL_WIDTH: u16 = 40;
/// Narrowest allowed tree panel.
pub const MIN_PANEL_WIDTH: u16 = 10;
/// Widest allowed tree panel.
pub const MAX_PANEL_WIDTH: u16 = 200;
/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path, which is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("DIFFTREE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".difftree.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("difftree").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Logging is configured from the result, so this cannot log through
/// `tracing` yet.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            tree: TreeConfig {
                sort_by: other.tree.sort_by.clone().or(self.tree.sort_by),
                hide_when_single_change: other
                    .tree
                    .hide_when_single_change
                    .or(self.tree.hide_when_single_change),
                collapse_folders: other.tree.collapse_folders.or(self.tree.collapse_folders),
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            layout: LayoutConfig {
                panel_width: other.layout.panel_width.or(self.layout.panel_width),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
            },
            logging: LoggingConfig {
                enabled: other.logging.enabled.or(self.logging.enabled),
                level: other.logging.level.clone().or(self.logging.level),
                file: other.logging.file.clone().or(self.logging.file),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn sort_mode(&self) -> SortMode {
        self.tree
            .sort_by
            .as_deref()
            .and_then(|s| s.parse::<SortMode>().ok())
            .unwrap_or_default()
    }

    pub fn hide_when_single_change(&self) -> bool {
        self.tree.hide_when_single_change.unwrap_or(true)
    }

    pub fn collapse_folders(&self) -> bool {
        self.tree.collapse_folders.unwrap_or(true)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(false)
    }

    /// Tree panel width, clamped to a usable range.
    pub fn panel_width(&self) -> u16 {
        self.layout
            .panel_width
            .unwrap_or(DEFAULT_PANEL_WIDTH)
            .clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH)
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging.enabled.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log file path; `<data dir>/difftree/difftree.log` unless configured.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.logging.file {
            Some(file) => Some(PathBuf::from(file)),
            None => dirs::data_dir().map(|dir| dir.join("difftree").join("difftree.log")),
        }
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    /// The settings the diff session reads.
    pub fn settings(&self) -> Settings {
        Settings {
            sort_mode: self.sort_mode(),
            hide_when_single_change: self.hide_when_single_change(),
            collapse_folders: self.collapse_folders(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
