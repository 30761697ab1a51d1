//! Unit tests for validation.rs module

use deleted_sms_report::error::ReportError;
use deleted_sms_report::validation::{InputValidator, RETENTION_DAYS};

#[test]
fn test_validate_extension_id_eleven_digits() {
    assert!(InputValidator::validate_extension_id("12345678901").is_ok());
}

#[test]
fn test_validate_extension_id_empty() {
    assert!(matches!(InputValidator::validate_extension_id(""), Err(ReportError::Config(_))));
}

#[test]
fn test_validate_extension_id_whitespace_only() {
    assert!(InputValidator::validate_extension_id("   ").is_err());
}

#[test]
fn test_validate_extension_id_placeholder_text() {
    assert!(InputValidator::validate_extension_id("11_digit_extension_id").is_err());
}

#[test]
fn test_validate_extension_id_too_long() {
    let id = "1".repeat(21);
    assert!(InputValidator::validate_extension_id(&id).is_err());
}

#[test]
fn test_validate_extension_id_exactly_20_digits() {
    let id = "9".repeat(20);
    assert!(InputValidator::validate_extension_id(&id).is_ok());
}

#[test]
fn test_validate_extension_id_tilde_rejected() {
    assert!(InputValidator::validate_extension_id("~").is_err());
}

#[test]
fn test_validate_server_url_https() {
    assert!(InputValidator::validate_server_url("https://platform.ringcentral.com").is_ok());
}

#[test]
fn test_validate_server_url_http_local() {
    assert!(InputValidator::validate_server_url("http://127.0.0.1:8080").is_ok());
}

#[test]
fn test_validate_server_url_missing_scheme() {
    assert!(InputValidator::validate_server_url("platform.ringcentral.com").is_err());
}

#[test]
fn test_validate_server_url_with_space() {
    assert!(InputValidator::validate_server_url("https://platform ringcentral.com").is_err());
}

#[test]
fn test_long_window_is_valid_but_exceeds_retention() {
    assert!(InputValidator::validate_window_days(120).is_ok());
    assert!(InputValidator::exceeds_retention(120));
    assert!(InputValidator::exceeds_retention(RETENTION_DAYS + 1));
    assert!(!InputValidator::exceeds_retention(RETENTION_DAYS));
    assert!(!InputValidator::exceeds_retention(30));
}

#[test]
fn test_validate_window_days_bounds() {
    assert!(InputValidator::validate_window_days(0).is_err());
    assert!(InputValidator::validate_window_days(1).is_ok());
    assert!(InputValidator::validate_window_days(30).is_ok());
    assert!(InputValidator::validate_window_days(365).is_ok());
    assert!(InputValidator::validate_window_days(366).is_err());
}

#[test]
fn test_validate_per_page_bounds() {
    assert!(InputValidator::validate_per_page(0).is_err());
    assert!(InputValidator::validate_per_page(100).is_ok());
    assert!(InputValidator::validate_per_page(1000).is_ok());
    assert!(InputValidator::validate_per_page(1001).is_err());
}

#[test]
fn test_validate_output_path_valid() {
    assert!(InputValidator::validate_output_path("rpt").is_ok());
    assert!(InputValidator::validate_output_path("reports/readable.xlsx").is_ok());
}

#[test]
fn test_validate_output_path_empty() {
    assert!(InputValidator::validate_output_path("").is_err());
}

#[test]
fn test_validate_output_path_null_byte() {
    assert!(InputValidator::validate_output_path("rpt\0").is_err());
}

#[test]
fn test_validate_output_path_too_long() {
    let path = "a".repeat(4097);
    assert!(InputValidator::validate_output_path(&path).is_err());
}
