use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReportError, Result};

#[allow(clippy::expect_used)]
fn extension_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{1,20}$").expect("static pattern"))
}

/// Days the provider keeps deleted messages; longer windows return nothing extra.
pub const RETENTION_DAYS: u32 = 90;

/// Validation utilities for operator-supplied settings
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate the extension id: ASCII digits only, at most 20 of them
    pub fn validate_extension_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ReportError::Config(
                "Extension ID is not set (provider.extension_id or --extension-id)".to_string(),
            ));
        }

        if !extension_id_pattern().is_match(id) {
            return Err(ReportError::Config(format!("Extension ID must be 1-20 digits, got {id:?}")));
        }

        Ok(())
    }

    /// Validate the provider base URL
    pub fn validate_server_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ReportError::Config("SERVER_URL cannot be empty".to_string()));
        }

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ReportError::Config(format!("SERVER_URL must start with http:// or https://, got {url}")));
        }

        if url.contains(char::is_whitespace) {
            return Err(ReportError::Config("SERVER_URL contains whitespace".to_string()));
        }

        Ok(())
    }

    /// Validate the trailing window length
    pub fn validate_window_days(days: u32) -> Result<()> {
        if days == 0 {
            return Err(ReportError::Config("window_days must be greater than 0".to_string()));
        }

        if days > 365 {
            return Err(ReportError::Config("window_days too large (max 365)".to_string()));
        }

        Ok(())
    }

    /// True when `days` reaches past the provider's retention of deleted
    /// messages. Not an error; callers log it once logging is up.
    #[must_use]
    pub const fn exceeds_retention(days: u32) -> bool {
        days > RETENTION_DAYS
    }

    /// Validate page size
    pub fn validate_per_page(per_page: u32) -> Result<()> {
        if per_page == 0 {
            return Err(ReportError::Config("per_page must be greater than 0".to_string()));
        }

        if per_page > 1000 {
            return Err(ReportError::Config("per_page too large (max 1000)".to_string()));
        }

        Ok(())
    }

    /// Validate an output file or directory path
    pub fn validate_output_path(path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(ReportError::Config("Output path cannot be empty".to_string()));
        }

        if path.contains('\0') {
            return Err(ReportError::Config("Output path contains invalid characters".to_string()));
        }

        if path.len() > 4096 {
            return Err(ReportError::Config("Output path too long (max 4096 characters)".to_string()));
        }

        Ok(())
    }
}
