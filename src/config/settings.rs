//! Application settings
//!
//! Provides configuration loading from environment variables,
//! configuration files, and command-line overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host configuration key the uploader credentials live under
pub const UPLOADER_CONFIG_KEY: &str = "picBed.superbed";

// Helper functions for serde defaults
fn default_site_url() -> String {
    "https://www.superbed.cn".to_string()
}

fn default_api_url() -> String {
    "https://api.superbed.cn".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_referrer() -> String {
    "https://www.superbed.cn/".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_debug_endpoint() -> String {
    "http://127.0.0.1:3000/".to_string()
}

/// Main configuration settings
///
/// Unknown top-level tables (such as the host-keyed `[picBed.superbed]`
/// credentials stored in the same file) are ignored here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Diagnostic channel configuration
    #[serde(default)]
    pub debug: DebugSettings,
}

/// Provider endpoints, fixed headers and transport tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Provider web site (login, ticket and URL resolution)
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// Paid API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// User-Agent sent with free-tier requests; the provider rejects defaults
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Referrer sent with free-tier requests
    #[serde(default = "default_referrer")]
    pub referrer: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// All protocols proxy URL
    #[serde(default)]
    pub all_proxy: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

/// Diagnostic channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Forward request/response traces to `endpoint`
    #[serde(default)]
    pub enabled: bool,
    /// Receiver URL (see `superbed-upload debug-server`)
    #[serde(default = "default_debug_endpoint")]
    pub endpoint: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            referrer: default_referrer(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_debug_endpoint(),
        }
    }
}

impl NetworkSettings {
    /// Site URL without a trailing slash, ready for path joining
    pub fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// API URL without a trailing slash, ready for path joining
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Connection timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();

        if let Ok(site_url) = std::env::var("SUPERBED_SITE_URL") {
            settings.network.site_url = site_url;
        }

        if let Ok(api_url) = std::env::var("SUPERBED_API_URL") {
            settings.network.api_url = api_url;
        }

        if let Ok(timeout) = std::env::var("SUPERBED_REQUEST_TIMEOUT") {
            settings.network.request_timeout = timeout.parse().map_err(|e| {
                crate::Error::config("request_timeout", &format!("Invalid timeout: {}", e))
            })?;
        }

        settings.network.https_proxy = std::env::var("HTTPS_PROXY").ok();
        settings.network.http_proxy = std::env::var("HTTP_PROXY").ok();
        settings.network.all_proxy = std::env::var("ALL_PROXY").ok();

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            settings.logging.level = level;
        }

        if let Ok(verbose) = std::env::var("VERBOSE") {
            settings.logging.verbose = verbose.parse().unwrap_or(false);
        }

        if let Ok(enabled) = std::env::var("SUPERBED_DEBUG") {
            settings.debug.enabled = enabled.parse().unwrap_or(false);
        }

        if let Ok(endpoint) = std::env::var("SUPERBED_DEBUG_ENDPOINT") {
            settings.debug.endpoint = endpoint;
        }

        Ok(settings)
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Merge settings with environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        let env_settings = Self::from_env()?;
        let defaults = Self::default();

        // Merge only non-default values from environment
        if env_settings.network.site_url != defaults.network.site_url {
            self.network.site_url = env_settings.network.site_url;
        }
        if env_settings.network.api_url != defaults.network.api_url {
            self.network.api_url = env_settings.network.api_url;
        }
        if env_settings.network.request_timeout != defaults.network.request_timeout {
            self.network.request_timeout = env_settings.network.request_timeout;
        }
        if env_settings.logging.level != defaults.logging.level {
            self.logging.level = env_settings.logging.level;
        }
        if env_settings.debug.enabled {
            self.debug.enabled = true;
        }
        if env_settings.debug.endpoint != defaults.debug.endpoint {
            self.debug.endpoint = env_settings.debug.endpoint;
        }

        // Proxy settings always override if present
        if env_settings.network.https_proxy.is_some() {
            self.network.https_proxy = env_settings.network.https_proxy;
        }
        if env_settings.network.http_proxy.is_some() {
            self.network.http_proxy = env_settings.network.http_proxy;
        }
        if env_settings.network.all_proxy.is_some() {
            self.network.all_proxy = env_settings.network.all_proxy;
        }

        Ok(self)
    }

    /// Get effective proxy URL based on priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .as_ref()
            .or(self.network.http_proxy.as_ref())
            .or(self.network.all_proxy.as_ref())
            .cloned()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("site_url", &self.network.site_url),
            ("api_url", &self.network.api_url),
            ("debug.endpoint", &self.debug.endpoint),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(crate::Error::config(
                    name,
                    &format!("Invalid URL '{}': {}", value, e),
                ));
            }
        }

        if self.network.request_timeout == 0 {
            return Err(crate::Error::config(
                "request_timeout",
                "Invalid request timeout: cannot be 0",
            ));
        }

        if self.network.connect_timeout == 0 {
            return Err(crate::Error::config(
                "connect_timeout",
                "Invalid connect timeout: cannot be 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        for (name, proxy_url) in [
            ("https_proxy", &self.network.https_proxy),
            ("http_proxy", &self.network.http_proxy),
            ("all_proxy", &self.network.all_proxy),
        ] {
            if let Some(url_str) = proxy_url
                && let Err(e) = url::Url::parse(url_str)
            {
                return Err(crate::Error::config(
                    name,
                    &format!("Invalid proxy URL '{}': {}", url_str, e),
                ));
            }
        }

        Ok(())
    }
}
