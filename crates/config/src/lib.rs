//! Configuration loading, validation, and management for CityGuide.
//!
//! Loads configuration from `~/.cityguide/config.toml`, then `.env` and
//! `.secrets` files in the working directory, then environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cityguide/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation/embedding gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Text generation and embedding endpoint
    #[serde(default)]
    pub provider: ProviderConfig,

    /// The city the assistant covers
    #[serde(default)]
    pub city: CityConfig,

    /// Knowledge base source and storage
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Per-conversation settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("city", &self.city)
            .field("knowledge", &self.knowledge)
            .field("session", &self.session)
            .finish()
    }
}

/// How the API key is presented to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthHeader {
    /// `Authorization: Bearer <key>`
    #[serde(rename = "bearer")]
    Bearer,
    /// `x-api-key: <key>`
    #[serde(rename = "x-api-key")]
    XApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible base URL (without `/chat/completions`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_auth_header")]
    pub auth_header: AuthHeader,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on every generation/embedding call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_auth_header() -> AuthHeader {
    AuthHeader::Bearer
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embed_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.4
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_header: default_auth_header(),
            model: default_model(),
            embed_model: default_embed_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    #[serde(default = "default_city_name")]
    pub name: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA timezone used for the daily forecast window
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Weather lookup timeout
    #[serde(default = "default_weather_timeout_secs")]
    pub weather_timeout_secs: u64,
}

fn default_city_name() -> String {
    "Toronto".into()
}
fn default_latitude() -> f64 {
    43.6532
}
fn default_longitude() -> f64 {
    -79.3832
}
fn default_timezone() -> String {
    "America/Toronto".into()
}
fn default_weather_timeout_secs() -> u64 {
    20
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            name: default_city_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
            weather_timeout_secs: default_weather_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// CSV with `id`, `text` and optional metadata columns
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Directory holding persisted collections
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Texts per embedding request during ingestion
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/toronto_travel_tips.csv")
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("db")
}
fn default_collection() -> String {
    "toronto_travel_tips".into()
}
fn default_batch_size() -> usize {
    64
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            store_dir: default_store_dir(),
            collection: default_collection(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turns (user + assistant pairs) kept in history
    #[serde(default = "default_max_turns")]
    pub max_turns_in_context: usize,
}

fn default_max_turns() -> usize {
    18
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns_in_context: default_max_turns(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cityguide/config.toml).
    ///
    /// `.env` and `.secrets` in the working directory are read first (they
    /// never override variables already set), then environment variables
    /// override file values:
    /// - `API_GATEWAY_KEY` (sent as `x-api-key`), `CITYGUIDE_API_KEY`, `OPENAI_API_KEY`
    /// - `OPENAI_BASE_URL`, `OPENAI_MODEL`, `OPENAI_EMBED_MODEL`
    /// - `MAX_TURNS_IN_CONTEXT`
    pub fn load() -> Result<Self, ConfigError> {
        for file in [".env", ".secrets"] {
            if dotenvy::from_filename(file).is_ok() {
                tracing::debug!(file, "Loaded environment file");
            }
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(key) = var("API_GATEWAY_KEY") {
            self.api_key = Some(key);
            self.provider.auth_header = AuthHeader::XApiKey;
        } else if let Some(key) = var("CITYGUIDE_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(url) = var("OPENAI_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.provider.model = model;
        }
        if let Some(model) = var("OPENAI_EMBED_MODEL") {
            self.provider.embed_model = model;
        }
        if let Some(turns) = var("MAX_TURNS_IN_CONTEXT") {
            self.session.max_turns_in_context = turns.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "MAX_TURNS_IN_CONTEXT must be a positive integer, got '{turns}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cityguide")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("provider.base_url must not be empty".into()));
        }

        if self.session.max_turns_in_context == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_turns_in_context must be at least 1".into(),
            ));
        }

        if self.knowledge.batch_size == 0 {
            return Err(ConfigError::ValidationError("knowledge.batch_size must be at least 1".into()));
        }

        if !(-90.0..=90.0).contains(&self.city.latitude) || !(-180.0..=180.0).contains(&self.city.longitude) {
            return Err(ConfigError::ValidationError(
                "city.latitude/longitude out of range".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The API key, or the startup error every network-backed command reports.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential(
                "set API_GATEWAY_KEY or OPENAI_API_KEY (in the environment, .env or .secrets)".into(),
            )),
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            city: CityConfig::default(),
            knowledge: KnowledgeConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing API key: {0}")]
    MissingCredential(String),
}
