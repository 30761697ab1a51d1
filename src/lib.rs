//! Deleted SMS Report - Deleted Message Recovery and Export
//!
//! A Rust library for pulling deleted SMS/Text messages of one extension out
//! of a cloud telephony provider's message store and exporting them as
//! per-contact conversations.
//!
//! # Features
//!
//! - JWT login against the provider's OAuth endpoint
//! - Extension lookup with account main-number fallback
//! - Cursor pagination over a trailing date window
//! - Grouping by counterpart phone number with parsed-time ordering
//! - Export to XLSX (or CSV/JSON) and a console transcript

/// Session bootstrap
pub mod auth;
/// Provider REST client
pub mod client;
/// Configuration management
pub mod config;
/// Classification and conversation grouping
pub mod conversations;
/// Error types
pub mod error;
/// Report file writers
pub mod file_writer;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Message-store pagination
pub mod paginator;
/// End-to-end report pipeline
pub mod pipeline;
/// Console transcript
pub mod report;
/// Extension resolution
pub mod resolver;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use client::{ProviderApi, RestClient};
pub use config::{AppConfig, Credentials};
pub use error::{ReportError, Result};
pub use models::{MessageRecord, OutputFormat};
pub use paginator::Harvest;
pub use pipeline::Pipeline;
