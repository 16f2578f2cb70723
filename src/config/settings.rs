use crate::search::SearchOptions;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend host selection
    #[serde(default)]
    pub api: ApiSettings,

    /// Search timing
    #[serde(default)]
    pub search: SearchSettings,

    /// Signed-in user, if any
    #[serde(default)]
    pub user: UserSettings,

    /// Debug log output
    #[serde(default)]
    pub logging: LogSettings,
}

impl Config {
    /// Apply `BUNYANG_PROFILE` and `BUNYANG_API_URL` from the environment
    pub fn apply_env(&mut self) -> Result<()> {
        let profile = std::env::var("BUNYANG_PROFILE").ok();
        let base_url = std::env::var("BUNYANG_API_URL").ok();
        self.apply_overrides(profile.as_deref(), base_url.as_deref())
    }

    pub fn apply_overrides(&mut self, profile: Option<&str>, base_url: Option<&str>) -> Result<()> {
        if let Some(profile) = profile.map(str::trim).filter(|p| !p.is_empty()) {
            self.api.profile = match profile.to_ascii_lowercase().as_str() {
                "dev" => Profile::Dev,
                "prod" => Profile::Prod,
                other => bail!("Unknown profile '{other}' (expected dev or prod)"),
            };
        }
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.api.base_url_override = Some(url.to_string());
        }
        Ok(())
    }
}

/// Which backend host to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Dev,
    Prod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub profile: Profile,

    #[serde(default = "default_dev_base_url")]
    pub dev_base_url: String,

    /// Production host; required when `profile = "prod"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_base_url: Option<String>,

    /// Upper bound for analysis and other slow requests
    #[serde(default = "default_analyze_timeout_secs")]
    pub analyze_timeout_secs: u64,

    /// Set from the environment, never persisted
    #[serde(skip)]
    pub base_url_override: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            profile: Profile::Dev,
            dev_base_url: default_dev_base_url(),
            prod_base_url: None,
            analyze_timeout_secs: default_analyze_timeout_secs(),
            base_url_override: None,
        }
    }
}

impl ApiSettings {
    /// Base URL after profile selection and environment override
    pub fn base_url(&self) -> Result<&str> {
        if let Some(url) = &self.base_url_override {
            return Ok(url);
        }
        match self.profile {
            Profile::Dev => Ok(&self.dev_base_url),
            Profile::Prod => match self.prod_base_url.as_deref() {
                Some(url) if !url.trim().is_empty() => Ok(url),
                _ => bail!("profile is 'prod' but api.prod_base_url is not set"),
            },
        }
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Site search timeout; searches slower than this report a timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl SearchSettings {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms.max(1)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Attached to analysis requests and used to filter history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Write debug logs to a file
    #[serde(default)]
    pub debug: bool,

    /// Log file or directory; defaults next to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Rotated files to keep (0 keeps everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Single append-only file
    None,
    Daily,
    /// One file per run
    Session,
}

fn default_dev_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analyze_timeout_secs() -> u64 {
    60
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_request_timeout_ms() -> u64 {
    5000
}
