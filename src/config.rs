//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the `-f` path), then applies `SNOOZE_WORK_DIR`, `SNOOZE_LOG_LEVEL`
//! and `SNOOZE_API_URL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// Remote story/user API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the story service, without a trailing slash.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Console rendering configuration.
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Stories rendered per view before the list is cut off.
    pub page_size: usize,
    /// Ask before deleting a story.
    pub confirm_delete: bool,
}

/// Fully-resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

// Raw TOML shape, the serde target before resolution.

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    client: RawClient,
    #[serde(default)]
    api: RawApi,
    #[serde(default)]
    ui: RawUi,
}

#[derive(Deserialize)]
struct RawClient {
    #[serde(default = "default_work_dir")]
    work_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawApi {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

#[derive(Deserialize)]
struct RawUi {
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default = "default_true")]
    confirm_delete: bool,
}

impl Default for RawClient {
    fn default() -> Self {
        Self { work_dir: default_work_dir(), log_level: default_log_level() }
    }
}

impl Default for RawApi {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_seconds: default_timeout_seconds() }
    }
}

impl Default for RawUi {
    fn default() -> Self {
        Self { page_size: default_page_size(), confirm_delete: true }
    }
}

fn default_work_dir() -> String {
    "~/.snooze".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://hack-or-snooze-v3.herokuapp.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_page_size() -> usize {
    25
}

fn default_true() -> bool {
    true
}

/// Default config file path, relative to the current working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load config, then apply env-var overrides.
///
/// `path` is the explicit `-f` argument; `None` means [`DEFAULT_CONFIG_PATH`].
/// An explicit path that cannot be read is an error. A missing file at the
/// default path falls back to built-in defaults, so the client runs from any
/// directory.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("SNOOZE_WORK_DIR").ok();
    let log_level_override = env::var("SNOOZE_LOG_LEVEL").ok();
    let api_url_override = env::var("SNOOZE_API_URL").ok();
    load_from(
        path.map(Path::new),
        work_dir_override.as_deref(),
        log_level_override.as_deref(),
        api_url_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: Option<&Path>,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
    api_url_override: Option<&str>,
) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", p.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", p.display())))?
        }
        None => {
            let p = Path::new(DEFAULT_CONFIG_PATH);
            match fs::read_to_string(p) {
                Ok(raw) => toml::from_str(&raw)
                    .map_err(|e| AppError::Config(format!("parse error in {}: {e}", p.display())))?,
                // No config shipped next to the binary: built-in defaults.
                Err(_) => RawConfig::default(),
            }
        }
    };

    let work_dir_str = work_dir_override.unwrap_or(&parsed.client.work_dir).to_string();
    let work_dir = expand_home(&work_dir_str);
    let log_level = log_level_override.unwrap_or(&parsed.client.log_level).to_string();
    let base_url = api_url_override
        .unwrap_or(&parsed.api.base_url)
        .trim_end_matches('/')
        .to_string();

    Ok(Config {
        work_dir,
        log_level,
        api: ApiConfig {
            base_url,
            timeout_seconds: parsed.api.timeout_seconds,
        },
        ui: UiConfig {
            page_size: parsed.ui.page_size.max(1),
            confirm_delete: parsed.ui.confirm_delete,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
