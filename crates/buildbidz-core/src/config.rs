// Configuration loading and parsing (client.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::poll::{
    DEFAULT_CHAT_INTERVAL_SECS, DEFAULT_NOTIFICATION_INTERVAL_SECS, MAX_INTERVAL_SECS,
    MIN_INTERVAL_SECS,
};

/// Environment variable that overrides `server.base_url`.
pub const BACKEND_URL_ENV: &str = "BUILDBIDZ_BACKEND_URL";

/// Upper bound for `uploads.max_file_size_mb`.
pub const MAX_UPLOAD_MB: u64 = 1024;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("could not seed config in {path}: {message}")]
    Seed { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub uploads: UploadsConfig,
    pub storage: StorageConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// client.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire client.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ClientFile {
    server: ServerConfig,
    #[serde(default)]
    polling: PollingConfig,
    #[serde(default)]
    uploads: UploadsConfig,
    #[serde(default)]
    storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub chat_interval_secs: u64,
    pub notification_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            chat_interval_secs: DEFAULT_CHAT_INTERVAL_SECS,
            notification_interval_secs: DEFAULT_NOTIFICATION_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub max_file_size_mb: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
        }
    }
}

impl UploadsConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the local store and downloads. Falls back to the
    /// platform data directory when unset.
    pub data_dir: Option<String>,
    pub db_path: String,
    pub download_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: "buildbidz.db".to_string(),
            download_dir: "downloads".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

/// Optional auto-login account.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsConfig {
    /// Both halves present and non-empty.
    pub fn login(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => Some((e, p)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved paths
// ---------------------------------------------------------------------------

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return PathBuf::from(dir);
        }
        directories::ProjectDirs::from("in", "BuildBidz", "buildbidz")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn db_path(&self) -> PathBuf {
        resolve(&self.data_dir(), &self.storage.db_path)
    }

    pub fn download_dir(&self) -> PathBuf {
        resolve(&self.data_dir(), &self.storage.download_dir)
    }
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    if path == ":memory:" || Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        base.join(path)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/client.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults and ignores the environment; `load_config()`
/// does both.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- client.toml (required) ---
    let client_path = config_dir.join("client.toml");
    let client_text = read_file(&client_path)?;
    let client: ClientFile = toml::from_str(&client_text).map_err(|e| ConfigError::ParseError {
        path: client_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        server: client.server,
        polling: client.polling,
        uploads: client.uploads,
        storage: client.storage,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Apply an environment override of the backend URL and re-validate.
pub fn apply_backend_override(config: &mut Config, url: Option<String>) -> Result<(), ConfigError> {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        config.server.base_url = url.trim().to_string();
        validate(config)?;
    }
    Ok(())
}

/// Files seeded from `defaults/` into `config/` when missing. The
/// credentials template stays an opt-in copy.
const SEEDED_FILES: &[&str] = &["client.toml"];

/// Copy any missing seeded file from `defaults/` into `config/`, returning
/// the paths written. An existing `config/` copy is never overwritten.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, false) => {
            return Err(ConfigError::Seed {
                path: base_dir.to_path_buf(),
                message: "no defaults/ or config/ directory here; start the client from its install directory"
                    .into(),
            })
        }
        (false, true) => return Ok(Vec::new()),
        _ => {}
    }

    let seed_err = |path: &Path, e: std::io::Error| ConfigError::Seed {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    std::fs::create_dir_all(&config_dir).map_err(|e| seed_err(&config_dir, e))?;

    let mut written = Vec::new();
    for name in SEEDED_FILES {
        let template = defaults_dir.join(name);
        let target = config_dir.join(name);
        if !template.is_file() || target.exists() {
            continue;
        }
        std::fs::copy(&template, &target).map_err(|e| seed_err(&target, e))?;
        written.push(target);
    }
    Ok(written)
}

/// Load config relative to the current working directory, copying defaults
/// first and applying `BUILDBIDZ_BACKEND_URL`.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_backend_override(&mut config, std::env::var(BACKEND_URL_ENV).ok())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.server.base_url.trim();
    if url.is_empty() {
        return Err(invalid("server.base_url", "must not be empty"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(
            "server.base_url",
            format!("must start with http:// or https://, got `{url}`"),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        return Err(invalid("server.request_timeout_secs", "must be > 0"));
    }

    let range = MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS;
    let intervals: &[(&str, u64)] = &[
        ("polling.chat_interval_secs", config.polling.chat_interval_secs),
        (
            "polling.notification_interval_secs",
            config.polling.notification_interval_secs,
        ),
    ];
    for (name, val) in intervals {
        if !range.contains(val) {
            return Err(invalid(
                name,
                format!("must be between {MIN_INTERVAL_SECS} and {MAX_INTERVAL_SECS} seconds, got {val}"),
            ));
        }
    }

    let mb = config.uploads.max_file_size_mb;
    if !(1..=MAX_UPLOAD_MB).contains(&mb) {
        return Err(invalid(
            "uploads.max_file_size_mb",
            format!("must be between 1 and {MAX_UPLOAD_MB}, got {mb}"),
        ));
    }

    if config.storage.db_path.trim().is_empty() {
        return Err(invalid("storage.db_path", "must not be empty"));
    }
    if config.storage.download_dir.trim().is_empty() {
        return Err(invalid("storage.download_dir", "must not be empty"));
    }

    let creds = &config.credentials;
    if creds.email.is_some() != creds.password.is_some() {
        let missing = if creds.email.is_none() {
            "credentials.email"
        } else {
            "credentials.password"
        };
        return Err(invalid(missing, "email and password must be set together"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
