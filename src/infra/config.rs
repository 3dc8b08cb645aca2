//! Usage: Client configuration (defaults -> optional TOML file -> environment overrides).

use crate::shared::error::AppResult;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_DOTDIR_NAME: &str = ".bird";
const SESSION_FILE_NAME: &str = "session.json";
const MAX_REQUEST_TIMEOUT_SECS: u64 = 10 * 60;

pub const ENV_API_URL: &str = "BIRD_API_URL";
pub const ENV_GITHUB_CLIENT_ID: &str = "BIRD_GITHUB_CLIENT_ID";
pub const ENV_APP_ORIGIN: &str = "BIRD_APP_ORIGIN";
pub const ENV_DATA_DIR: &str = "BIRD_DATA_DIR";
pub const ENV_DOTDIR_NAME: &str = "BIRD_DOTDIR_NAME";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "BIRD_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Backend base URL; endpoint paths are appended to it.
    pub api_base_url: String,
    /// GitHub OAuth app client id.
    pub github_client_id: String,
    /// Origin the app is served from; the OAuth redirect URI is built from it.
    pub app_origin: String,
    /// Directory holding the persisted session.
    pub data_dir: Option<PathBuf>,
    // 0 disables the client-side timeout.
    pub request_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            github_client_id: String::new(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            data_dir: None,
            request_timeout_secs: 0,
        }
    }
}

impl AuthConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the TOML file at `path` (if it exists), then environment variables.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| format!("CONFIG_ERROR: failed to read {}: {e}", path.display()))?;
                parse_config_toml(&content)?
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "config file absent; using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_non_empty(ENV_API_URL) {
            self.api_base_url = v;
        }
        if let Some(v) = env_non_empty(ENV_GITHUB_CLIENT_ID) {
            self.github_client_id = v;
        }
        if let Some(v) = env_non_empty(ENV_APP_ORIGIN) {
            self.app_origin = v;
        }
        if let Some(v) = env_non_empty(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env_non_empty(ENV_REQUEST_TIMEOUT_SECS) {
            match v.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    value = %v,
                    "ignoring non-numeric {ENV_REQUEST_TIMEOUT_SECS}"
                ),
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        parse_http_url("api_base_url", &self.api_base_url)?;
        parse_http_url("app_origin", &self.app_origin)?;
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(format!(
                "SEC_INVALID_INPUT: request_timeout_secs must be <= {MAX_REQUEST_TIMEOUT_SECS}"
            )
            .into());
        }
        Ok(())
    }

    pub fn api_base(&self) -> AppResult<Url> {
        let mut url = parse_http_url("api_base_url", &self.api_base_url)?;
        // Keep any path prefix when joining endpoint paths.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn app_origin_url(&self) -> AppResult<Url> {
        parse_http_url("app_origin", &self.app_origin)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn resolved_data_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = self.data_dir.as_ref() {
            return Ok(dir.clone());
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "CONFIG_ERROR: cannot resolve home directory for session data".to_string())?;
        let dotdir = env_non_empty(ENV_DOTDIR_NAME).unwrap_or_else(|| DEFAULT_DOTDIR_NAME.to_string());
        Ok(PathBuf::from(home).join(dotdir))
    }

    pub fn session_file(&self) -> AppResult<PathBuf> {
        Ok(self.resolved_data_dir()?.join(SESSION_FILE_NAME))
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_http_url(field: &str, raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| format!("SEC_INVALID_INPUT: {field} is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("SEC_INVALID_INPUT: {field} must use http or https, got {other}").into()),
    }
}

fn parse_config_toml(content: &str) -> AppResult<AuthConfig> {
    toml::from_str::<AuthConfig>(content)
        .map_err(|e| format!("CONFIG_ERROR: invalid config toml: {e}").into())
}
