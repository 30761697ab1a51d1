//! Error types for the deleted-sms-report library.
//!
//! Every failure is fatal for a run. The variants exist so the log line names
//! the stage that failed; the process exit code is the same for all of them.

use thiserror::Error;

/// Errors that can occur while building a deleted-message report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Missing or invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token exchange with the provider failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Extension not present in the account
    #[error("Extension ID {0} not found in the account")]
    NotFound(String),

    /// Network failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status} for {endpoint}: {message}")]
    Status {
        /// Endpoint path that was requested
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Error description extracted from the body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A message carried a creation time that is not RFC 3339
    #[error("Invalid creationTime {value:?} on message {id}")]
    Timestamp {
        /// Message identifier
        id: String,
        /// The raw timestamp text
        value: String,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet writer errors
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ReportError {
    /// Short name of the failure class, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_) | Self::Timestamp { .. } => "transport",
            Self::Io(_) | Self::Xlsx(_) | Self::Csv(_) => "export",
        }
    }

    /// Process exit code for this error. Always 1.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

/// Convenience type alias for Result with `ReportError`
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<config::ConfigError> for ReportError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_transport_failures() {
        let err = ReportError::Status {
            endpoint: "/restapi/v1.0/account/~".to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_not_found_message() {
        let err = ReportError::NotFound("12345678901".to_string());
        assert_eq!(err.to_string(), "Extension ID 12345678901 not found in the account");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_every_failure_exits_with_one() {
        let errors = [
            ReportError::Config("missing".to_string()),
            ReportError::Auth("HTTP 401".to_string()),
            ReportError::NotFound("1".to_string()),
            ReportError::Io(std::io::Error::other("disk full")),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }
}
