use crate::content::{Platform, PlatformKey};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Offline platform table. Empty means the built-in table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<PlatformEntry>,
}

// ── Content API ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the content API (default: <http://localhost:8000/api>)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token issued at login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Session lifetime in seconds; 0 disables expiry (default: 86400)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

// ── Review workflow ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValidationMode {
    /// Validate in-process against the catalog limits
    Local,
    /// Ask the content API
    #[default]
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Quiet period after the last edit before validating (default: 500)
    #[serde(default = "default_debounce_ms")]
    pub validation_debounce_ms: u64,
    #[serde(default)]
    pub validation_mode: ValidationMode,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            validation_debounce_ms: default_debounce_ms(),
            validation_mode: ValidationMode::default(),
        }
    }
}

// ── Logging ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Offline platforms ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub key: PlatformKey,
    #[serde(flatten)]
    pub platform: Platform,
}
