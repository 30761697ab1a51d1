use std::collections::BTreeMap;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::models::OutputFormat;
use crate::validation::InputValidator;

/// Environment variable names of the provider credentials, all required.
pub const CREDENTIAL_KEYS: [&str; 4] = ["CLIENT_ID", "CLIENT_SECRET", "SERVER_URL", "JWT_TOKEN"];

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider query settings
    pub provider: ProviderConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Report output settings
    pub export: ExportConfig,
}

/// Settings for talking to the telephony provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Extension whose deleted messages are reported
    pub extension_id: String,
    /// Length of the trailing window in days
    pub window_days: u32,
    /// Records requested per page
    pub per_page: u32,
    /// Whole-request timeout
    pub request_timeout_secs: u64,
    /// TCP/TLS connect timeout
    pub connect_timeout_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Optional JSON log file, rotated daily
    pub file_path: Option<String>,
    /// Console format: "text" or "json"
    pub format: String,
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write report files at all
    pub enabled: bool,
    /// File format of the tabular reports
    pub format: OutputFormat,
    /// Directory for the tabular reports
    pub output_directory: String,
    /// Path of the readable transcript workbook
    pub readable_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                extension_id: String::new(),
                window_days: 30,
                per_page: 100,
                request_timeout_secs: 30,
                connect_timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            export: ExportConfig {
                enabled: true,
                format: OutputFormat::Xlsx,
                output_directory: "rpt".to_string(),
                readable_path: "readable.xlsx".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&Self::default())?)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("deleted_sms").required(false))
            // e.g. DELETED_SMS_PROVIDER__EXTENSION_ID
            .add_source(
                Environment::with_prefix("DELETED_SMS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_extension_id(&self.provider.extension_id)?;
        InputValidator::validate_window_days(self.provider.window_days)?;
        InputValidator::validate_per_page(self.provider.per_page)?;

        if self.provider.request_timeout_secs == 0 {
            return Err(ReportError::Config("request_timeout_secs must be greater than 0".to_string()));
        }
        if self.provider.connect_timeout_secs == 0 {
            return Err(ReportError::Config("connect_timeout_secs must be greater than 0".to_string()));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ReportError::Config(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ReportError::Config(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        InputValidator::validate_output_path(&self.export.output_directory)?;
        InputValidator::validate_output_path(&self.export.readable_path)?;

        Ok(())
    }

    /// Whole-request timeout as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }

    /// Connect timeout as a `Duration`
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.connect_timeout_secs)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

/// Provider credentials for the JWT login
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Provider base URL, e.g. `https://platform.ringcentral.com`
    pub server_url: String,
    /// Signed JWT credential
    pub jwt_token: String,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`. Every missing or blank key is
    /// reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();
        for key in CREDENTIAL_KEYS {
            match lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty()) {
                Some(value) => {
                    values.insert(key, value);
                },
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            return Err(ReportError::Config(format!(
                "Missing required credentials: {}. Set them in the environment or a .env file",
                missing.join(", ")
            )));
        }

        let mut take = |key: &str| values.remove(key).unwrap_or_default();
        let credentials = Self {
            client_id: take("CLIENT_ID"),
            client_secret: take("CLIENT_SECRET"),
            server_url: take("SERVER_URL").trim_end_matches('/').to_string(),
            jwt_token: take("JWT_TOKEN"),
        };
        InputValidator::validate_server_url(&credentials.server_url)?;
        Ok(credentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("server_url", &self.server_url)
            .field("jwt_token", &"<redacted>")
            .finish()
    }
}
