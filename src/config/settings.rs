//! Application settings loaded from config.toml
//!
//! Every section is optional; missing values fall back to the defaults below. A few
//! values can be overridden from the environment (usually via `.env`):
//! `INVENTORY_CONFIG` selects the settings file, `NOTIFICATION_URL` replaces the
//! notification endpoint, and `REDIS_URL` replaces the Redis server address.

use crate::cache::CachePolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Employee abbreviation quota; reaching it notifies an administrator.
pub const DEFAULT_QUOTA: u64 = 3;
/// Freshness of a cached single computer record.
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(60);
/// Freshness of a cached per-employee computer list.
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(30 * 60);

const DEFAULT_NOTIFICATION_URL: &str = "http://host.docker.internal:8080/api/notify";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub assignment: AssignmentSettings,
    /// Employees inserted at startup when missing
    #[serde(default)]
    pub employees: Vec<EmployeeConfig>,
}

/// Where and how administrator notifications are delivered.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Endpoint receiving the JSON payload
    pub url: String,
    /// Upper bound for a single delivery attempt
    pub timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOTIFICATION_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Which cache tier backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    /// In-process map, lost on restart
    #[default]
    Memory,
    /// Redis server shared by every instance
    Redis,
}

/// Cache tier selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Backend to construct at startup
    pub backend: CacheBackendKind,
    /// Server address, used only by the Redis backend
    pub redis_url: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

/// Tunables of the assignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssignmentSettings {
    /// Number of computers at which an administrator is notified
    pub quota: u64,
    /// Evict affected cache keys after every successful write
    pub evict_on_write: bool,
    /// Policy for `computer:<id>` entries
    pub record_cache: CachePolicy,
    /// Policy for `computers_by_employee_<abbrev>` entries
    pub list_cache: CachePolicy,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            evict_on_write: true,
            record_cache: CachePolicy::with_ttl(DEFAULT_RECORD_TTL),
            list_cache: CachePolicy::with_ttl(DEFAULT_LIST_TTL),
        }
    }
}

/// An employee from the seed roster.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeConfig {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Unique email address
    pub email: String,
    /// Unique short code, e.g. "JAD"
    pub abbreviation: String,
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid settings TOML.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `INVENTORY_CONFIG` (default `./config.toml`), using defaults
/// when the file does not exist, then applies environment overrides.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("INVENTORY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut settings = if Path::new(&path).exists() {
        load_settings(&path)?
    } else {
        info!("No settings file at {}, using defaults", path);
        Settings::default()
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(url) = std::env::var("NOTIFICATION_URL") {
        debug!("NOTIFICATION_URL overrides configured notification endpoint");
        settings.notification.url = url;
    }
    if let Ok(url) = std::env::var("REDIS_URL") {
        debug!("REDIS_URL overrides configured Redis server");
        settings.cache.redis_url = url;
    }
}
