//! Configuration management for IPO Desk.
//!
//! The service reads a single configuration file at `~/.ipodesk/config.json`.
//! A missing file is not an error: every section falls back to its defaults.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (`IPO_DESK_*` prefix, LLM API keys)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `IPO_DESK_BIND` → network.bind
//! - `IPO_DESK_PORT` → network.port
//! - `IPO_DESK_LOG_LEVEL` → observability.log_level
//! - `IPO_DESK_LOG_FORMAT` → observability.log_format
//! - `IPO_DESK_MODEL` → llm.model
//! - `IPO_DESK_CACHE_TTL_SECS` → cache.ttl_secs
//! - `IPO_DESK_CHROME` → scraper.chrome_executable
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` → secrets.google

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".ipodesk"),
        |dirs| dirs.home_dir().join(".ipodesk"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network
// ============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address. Default is `127.0.0.1` (local only).
    /// Set to `0.0.0.0` to allow remote access.
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_port(),
        }
    }
}

impl NetworkConfig {
    /// `bind:port` string suitable for `SocketAddr` parsing.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// ============================================================================
// Secrets
// ============================================================================

/// Credentials. Never logged.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    /// Google AI (Gemini) API key
    #[serde(default)]
    pub google: Option<String>,
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConfig")
            .field("google", &self.google.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// LLM
// ============================================================================

/// Summarizer (Gemini) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i64,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// API base URL (overridable for proxies and tests)
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
            base_url: default_llm_base_url(),
        }
    }
}

// ============================================================================
// Scraper
// ============================================================================

/// Dashboard and detail-page scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Site origin; relative listing links are resolved against it
    #[serde(default = "default_site_base_url")]
    pub base_url: String,

    /// Path of the IPO dashboard page
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,

    /// DOM id of the detail page content container
    #[serde(default = "default_detail_container_id")]
    pub detail_container_id: String,

    /// User agent presented by the headless browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Seconds to wait for a page marker before giving up
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary (auto-detected when unset)
    #[serde(default)]
    pub chrome_executable: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_site_base_url(),
            dashboard_path: default_dashboard_path(),
            detail_container_id: default_detail_container_id(),
            user_agent: default_user_agent(),
            render_timeout_secs: default_render_timeout(),
            headless: true,
            chrome_executable: None,
        }
    }
}

impl ScraperConfig {
    /// Full dashboard URL.
    pub fn dashboard_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.dashboard_path
        )
    }
}

// ============================================================================
// Cache / Report
// ============================================================================

/// Listing cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window for the scraped IPO lists
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// Batch report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Fixed pause between consecutive IPO analyses
    #[serde(default = "default_report_pause")]
    pub pause_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pause_secs: default_report_pause(),
        }
    }
}

// ============================================================================
// Observability
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Aliases: "level"
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    /// Aliases: "format"
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to exclude from logging.
    ///
    /// These modules will be set to `warn` level to reduce noise.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    ///
    /// An explicit `path` must exist; the default path may be absent.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("IPO_DESK_BIND") {
            self.network.bind = bind;
        }
        if let Some(port) = lookup("IPO_DESK_PORT") {
            if let Ok(p) = port.parse() {
                self.network.port = p;
            }
        }
        if let Some(level) = lookup("IPO_DESK_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("IPO_DESK_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(model) = lookup("IPO_DESK_MODEL") {
            self.llm.model = model;
        }
        if let Some(ttl) = lookup("IPO_DESK_CACHE_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.cache.ttl_secs = t;
            }
        }
        if let Some(chrome) = lookup("IPO_DESK_CHROME") {
            self.scraper.chrome_executable = Some(chrome);
        }

        // GEMINI_API_KEY takes priority over GOOGLE_API_KEY
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            if !key.is_empty() {
                self.secrets.google = Some(key);
            }
        }
    }

    /// Google AI API key, if configured and non-empty.
    pub fn google_api_key(&self) -> Option<&str> {
        self.secrets.google.as_deref().filter(|k| !k.is_empty())
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_llm_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f64 {
    0.4
}
fn default_max_output_tokens() -> i64 {
    8192
}
fn default_llm_timeout() -> u64 {
    120
}
fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_site_base_url() -> String {
    "https://www.chittorgarh.com".into()
}
fn default_dashboard_path() -> String {
    "/ipo/ipo_dashboard.asp".into()
}
fn default_detail_container_id() -> String {
    "main".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".into()
}
fn default_render_timeout() -> u64 {
    20
}
fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}
fn default_report_pause() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_true() -> bool {
    true
}
