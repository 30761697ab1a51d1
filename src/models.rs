//! Data models for provider responses and normalized message records
//!
//! Provider JSON is decoded into the `Raw*`/wire structs and converted into a
//! [`MessageRecord`] right away, so the rest of the pipeline works with one
//! well-defined shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReportError;

/// Format used for `dateFrom`/`dateTo` query parameters.
pub const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Availability value requested from the message store.
pub const DELETED_AVAILABILITY: &str = "Deleted";

/// Provider message type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// `SMS`
    Sms,
    /// `Text`
    Text,
    /// Fax, VoiceMail, Pager and anything else the provider sends
    Other(String),
}

impl MessageType {
    /// True for the two types that take part in conversations.
    #[must_use]
    pub const fn is_text_message(&self) -> bool {
        matches!(self, Self::Sms | Self::Text)
    }

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sms => "SMS",
            Self::Text => "Text",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SMS" => Self::Sms,
            "Text" => Self::Text,
            _ => Self::Other(value),
        }
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.as_str().to_string()
    }
}

/// Provider-side message lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Availability {
    /// `Alive`
    Alive,
    /// `Deleted`
    Deleted,
    /// `Purged`
    Purged,
    /// Any other value
    Other(String),
}

impl Availability {
    /// True when the message sits in the provider's deleted state.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Alive => "Alive",
            Self::Deleted => DELETED_AVAILABILITY,
            Self::Purged => "Purged",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Availability {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Alive" => Self::Alive,
            DELETED_AVAILABILITY => Self::Deleted,
            "Purged" => Self::Purged,
            _ => Self::Other(value),
        }
    }
}

impl From<Availability> for String {
    fn from(value: Availability) -> Self {
        value.as_str().to_string()
    }
}

/// Message direction relative to the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    /// Received by the extension
    Inbound,
    /// Sent by the extension
    Outbound,
    /// Missing or unrecognized; handled like inbound
    Other(String),
}

impl Direction {
    /// True only for `Outbound`.
    #[must_use]
    pub const fn is_outbound(&self) -> bool {
        matches!(self, Self::Outbound)
    }

    /// Transcript label: `sent` or `received`
    #[must_use]
    pub const fn label(&self) -> &'static str {
        if self.is_outbound() {
            "sent"
        } else {
            "received"
        }
    }

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Direction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Inbound" => Self::Inbound,
            "Outbound" => Self::Outbound,
            _ => Self::Other(value),
        }
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_str().to_string()
    }
}

/// A message record normalized from the provider's message store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Provider message id
    pub id: String,
    /// Sender phone number, empty when the provider omitted it
    pub from_phone: String,
    /// First recipient phone number, empty when absent
    pub to_phone: String,
    /// Message type
    pub message_type: MessageType,
    /// Lifecycle state
    pub availability: Availability,
    /// Direction relative to the extension
    pub direction: Direction,
    /// Parsed creation time, used for ordering
    pub creation_time: DateTime<Utc>,
    /// Creation time as the provider sent it
    pub creation_time_raw: String,
    /// Message body
    pub subject: String,
    /// Provider thread id
    pub conversation_id: String,
    /// Delivery status (Received, Sent, Delivered, ...)
    pub message_status: String,
}

/// Phone-number-bearing party on a message
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParty {
    /// Phone number in E.164 form
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// `to` is a list on the message store but a single object on some payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single entry
    One(T),
    /// A list of entries
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// First entry, if any
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.first(),
        }
    }
}

/// Message record as returned by the message-store endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Message id; numeric on the wire
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Sender
    #[serde(default)]
    pub from: Option<RawParty>,
    /// Recipients
    #[serde(default)]
    pub to: Option<OneOrMany<RawParty>>,
    /// Message type
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    /// Availability
    #[serde(default)]
    pub availability: Option<String>,
    /// Direction
    #[serde(default)]
    pub direction: Option<String>,
    /// ISO 8601 creation time
    #[serde(default)]
    pub creation_time: Option<String>,
    /// Message text
    #[serde(default)]
    pub subject: Option<String>,
    /// Thread id; numeric on the wire
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub conversation_id: Option<String>,
    /// Delivery status
    #[serde(default)]
    pub message_status: Option<String>,
}

impl RawMessage {
    /// True for SMS and Text records, decided before any other field is read
    #[must_use]
    pub fn is_text_message(&self) -> bool {
        matches!(self.message_type.as_deref(), Some("SMS" | "Text"))
    }
}

impl TryFrom<RawMessage> for MessageRecord {
    type Error = ReportError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let creation_time_raw = raw.creation_time.unwrap_or_default();
        let creation_time = DateTime::parse_from_rfc3339(&creation_time_raw)
            .map_err(|_| ReportError::Timestamp {
                id: raw.id.clone(),
                value: creation_time_raw.clone(),
            })?
            .with_timezone(&Utc);

        let from_phone = raw.from.and_then(|party| party.phone_number).unwrap_or_default();
        let to_phone = raw
            .to
            .as_ref()
            .and_then(OneOrMany::first)
            .and_then(|party| party.phone_number.clone())
            .unwrap_or_default();

        Ok(Self {
            id: raw.id,
            from_phone,
            to_phone,
            message_type: raw.message_type.unwrap_or_default().into(),
            availability: raw.availability.unwrap_or_default().into(),
            direction: raw.direction.unwrap_or_default().into(),
            creation_time,
            creation_time_raw,
            subject: raw.subject.unwrap_or_default(),
            conversation_id: raw.conversation_id.unwrap_or_default(),
            message_status: raw.message_status.unwrap_or_default(),
        })
    }
}

/// Paging block of a list response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// Token of the next page; absent on the final page
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub next_page_id: Option<String>,
}

/// One page of the message-store listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePage {
    /// Message records
    #[serde(default)]
    pub records: Vec<RawMessage>,
    /// Paging information
    #[serde(default)]
    pub paging: Paging,
}

/// Contact block of an extension
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionContact {
    /// Direct phone number
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// An extension (mailbox) within the account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Extension id; numeric on the wire
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Short dialable extension number
    #[serde(default)]
    pub extension_number: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Contact details
    #[serde(default)]
    pub contact: Option<ExtensionContact>,
}

impl Extension {
    /// Direct phone number, ignoring empty strings
    #[must_use]
    pub fn phone_number(&self) -> Option<&str> {
        self.contact
            .as_ref()
            .and_then(|contact| contact.phone_number.as_deref())
            .filter(|phone| !phone.is_empty())
    }
}

/// Extension list response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtensionList {
    /// Extensions
    #[serde(default)]
    pub records: Vec<Extension>,
}

/// Account info response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account main number
    #[serde(default)]
    pub main_number: Option<String>,
}

/// Trailing UTC time window for the message-store query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Window start (inclusive)
    pub from: DateTime<Utc>,
    /// Window end (inclusive)
    pub to: DateTime<Utc>,
}

impl DateWindow {
    /// `[now - days, now]`
    #[must_use]
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            from: now - Duration::days(i64::from(days)),
            to: now,
        }
    }

    /// `dateFrom` query value
    #[must_use]
    pub fn date_from_param(&self) -> String {
        self.from.format(WINDOW_FORMAT).to_string()
    }

    /// `dateTo` query value
    #[must_use]
    pub fn date_to_param(&self) -> String {
        self.to.format(WINDOW_FORMAT).to_string()
    }
}

/// Parameters for one message-store page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    /// Extension whose message store is listed
    pub extension_id: String,
    /// Time window
    pub window: DateWindow,
    /// Page cursor
    pub page: String,
    /// Page size
    pub per_page: u32,
}

impl MessageQuery {
    /// Query string pairs in the order the provider documents them
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("perPage", self.per_page.to_string()),
            ("page", self.page.clone()),
            ("dateFrom", self.window.date_from_param()),
            ("dateTo", self.window.date_to_param()),
            ("availability", DELETED_AVAILABILITY.to_string()),
        ]
    }
}

/// Output format for report files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values format
    Csv,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ReportError::Config(format!(
                "Invalid export format: {other}. Must be one of: xlsx, csv, json"
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?
        .map(String::from)
        .filter(|s| !s.is_empty()))
}
