//! End-to-end tests of the report pipeline against fixture provider responses

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;

use deleted_sms_report::client::ProviderApi;
use deleted_sms_report::config::AppConfig;
use deleted_sms_report::error::{ReportError, Result};
use deleted_sms_report::models::{Account, Extension, MessagePage, MessageQuery, OutputFormat};
use deleted_sms_report::pipeline::Pipeline;

const SELF_PHONE: &str = "+15550001111";
const EXTENSION_ID: &str = "12345678901";

/// Provider stand-in serving canned pages and recording every query
struct FixtureApi {
    extensions: serde_json::Value,
    account: serde_json::Value,
    pages: Mutex<VecDeque<serde_json::Value>>,
    queries: Mutex<Vec<MessageQuery>>,
    account_calls: Mutex<usize>,
}

impl FixtureApi {
    fn new(extensions: serde_json::Value, pages: Vec<serde_json::Value>) -> Self {
        Self {
            extensions,
            account: json!({"mainNumber": "+18005550100"}),
            pages: Mutex::new(pages.into()),
            queries: Mutex::new(Vec::new()),
            account_calls: Mutex::new(0),
        }
    }

    fn queries(&self) -> Vec<MessageQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderApi for FixtureApi {
    async fn list_extensions(&self) -> Result<Vec<Extension>> {
        Ok(serde_json::from_value::<Vec<Extension>>(self.extensions["records"].clone())?)
    }

    async fn get_account(&self) -> Result<Account> {
        *self.account_calls.lock().unwrap() += 1;
        Ok(serde_json::from_value(self.account.clone())?)
    }

    async fn list_messages(&self, query: &MessageQuery) -> Result<MessagePage> {
        self.queries.lock().unwrap().push(query.clone());
        let page = self.pages.lock().unwrap().pop_front().unwrap_or_else(|| json!({"records": []}));
        Ok(serde_json::from_value(page)?)
    }
}

fn extensions_with_phone() -> serde_json::Value {
    json!({"records": [
        {"id": 99999999999u64, "extensionNumber": "101"},
        {"id": 12345678901u64, "extensionNumber": "102", "contact": {"phoneNumber": SELF_PHONE}}
    ]})
}

fn sms(id: usize, direction: &str, counterpart: &str, minute: usize) -> serde_json::Value {
    let (from, to) = if direction == "Outbound" { (SELF_PHONE, counterpart) } else { (counterpart, SELF_PHONE) };
    json!({
        "id": id,
        "from": {"phoneNumber": from},
        "to": [{"phoneNumber": to}],
        "type": "SMS",
        "availability": "Deleted",
        "direction": direction,
        "creationTime": format!("2025-05-{:02}T{:02}:{:02}:00.000Z", 1 + minute / 1440, (minute / 60) % 24, minute % 60),
        "subject": format!("message {id}"),
        "conversationId": 555,
        "messageStatus": if direction == "Outbound" { "Delivered" } else { "Received" },
    })
}

fn page(records: Vec<serde_json::Value>, next: Option<&str>) -> serde_json::Value {
    match next {
        Some(next) => json!({"records": records, "paging": {"nextPageId": next}}),
        None => json!({"records": records, "paging": {}}),
    }
}

fn config(output: &std::path::Path, format: OutputFormat) -> AppConfig {
    let mut config = AppConfig::default();
    config.provider.extension_id = EXTENSION_ID.to_string();
    config.export.format = format;
    config.export.output_directory = output.join("rpt").display().to_string();
    config.export.readable_path = output.join("readable.xlsx").display().to_string();
    config
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_three_page_fixture_collects_150_records() {
    let first: Vec<_> = (0..100).map(|i| sms(i, "Inbound", "+15550002222", i)).collect();
    let second: Vec<_> = (100..150).map(|i| sms(i, "Outbound", "+15550003333", i)).collect();
    let api = FixtureApi::new(
        extensions_with_phone(),
        vec![page(first, Some("2")), page(second, Some("3")), page(Vec::new(), None)],
    );
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Xlsx);

    let harvest = Pipeline::new(&api, &config).collect(now()).await.unwrap();

    let pages: Vec<String> = api.queries().into_iter().map(|q| q.page).collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
    assert_eq!(harvest.all_messages.len(), 150);
    assert_eq!(harvest.deleted.len(), 150);
    assert_eq!(harvest.conversations.len(), 2);
    assert_eq!(harvest.conversations.bucket("+15550002222").map(<[_]>::len), Some(100));
    assert_eq!(harvest.conversations.bucket("+15550003333").map(<[_]>::len), Some(50));
    assert_eq!(harvest.metrics.pages_fetched, 3);
}

#[tokio::test]
async fn test_query_carries_window_and_deleted_filter() {
    let api = FixtureApi::new(extensions_with_phone(), vec![page(Vec::new(), None)]);
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), OutputFormat::Xlsx);
    config.provider.per_page = 250;

    Pipeline::new(&api, &config).collect(now()).await.unwrap();

    let queries = api.queries();
    assert_eq!(queries.len(), 1);
    let params = queries[0].params();
    assert!(params.contains(&("perPage", "250".to_string())));
    assert!(params.contains(&("page", "1".to_string())));
    assert!(params.contains(&("dateFrom", "2025-04-20T12:00:00Z".to_string())));
    assert!(params.contains(&("dateTo", "2025-05-20T12:00:00Z".to_string())));
    assert!(params.contains(&("availability", "Deleted".to_string())));
    assert_eq!(queries[0].extension_id, EXTENSION_ID);
}

#[tokio::test]
async fn test_unknown_extension_fails_before_message_fetch() {
    let api = FixtureApi::new(json!({"records": [{"id": 100}]}), vec![page(vec![sms(1, "Inbound", "+1", 0)], None)]);
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Xlsx);

    let err = Pipeline::new(&api, &config).collect(now()).await.unwrap_err();

    assert!(matches!(err, ReportError::NotFound(ref id) if id == EXTENSION_ID));
    assert!(api.queries().is_empty());
}

#[tokio::test]
async fn test_main_number_fallback_becomes_self_phone() {
    let mut record = sms(1, "Inbound", "+15550002222", 0);
    record["from"] = json!({});
    let api = FixtureApi::new(json!({"records": [{"id": EXTENSION_ID}]}), vec![page(vec![record], None)]);
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Xlsx);

    let harvest = Pipeline::new(&api, &config).collect(now()).await.unwrap();

    assert_eq!(*api.account_calls.lock().unwrap(), 1);
    assert_eq!(harvest.self_phone, "+18005550100");
    // Missing sender is attributed to the extension itself.
    assert_eq!(harvest.deleted[0].from_phone, "+18005550100");
    assert!(harvest.conversations.bucket("+18005550100").is_some());
}

#[tokio::test]
async fn test_malformed_timestamp_aborts_run() {
    let mut record = sms(1, "Inbound", "+15550002222", 0);
    record["creationTime"] = json!("05/01/2025 09:00");
    let api = FixtureApi::new(
        extensions_with_phone(),
        vec![page(vec![record], Some("2")), page(vec![sms(2, "Inbound", "+1", 1)], None)],
    );
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Xlsx);

    let err = Pipeline::new(&api, &config).collect(now()).await.unwrap_err();
    assert!(matches!(err, ReportError::Timestamp { .. }));
    assert_eq!(api.queries().len(), 1);
}

#[tokio::test]
async fn test_voicemail_without_creation_time_does_not_abort() {
    let voicemail = json!({"id": 7, "type": "VoiceMail", "availability": "Deleted", "direction": "Inbound"});
    let api = FixtureApi::new(
        extensions_with_phone(),
        vec![page(vec![voicemail, sms(8, "Inbound", "+15550002222", 0)], None)],
    );
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Xlsx);

    let harvest = Pipeline::new(&api, &config).collect(now()).await.unwrap();

    assert_eq!(harvest.metrics.discarded_records, 1);
    assert_eq!(harvest.deleted.len(), 1);
    assert_eq!(harvest.deleted[0].id, "8");
}

#[tokio::test]
async fn test_run_writes_csv_reports_and_transcript() {
    let mut fax = sms(3, "Inbound", "+15550002222", 2);
    fax["type"] = json!("Fax");
    let mut alive = sms(4, "Inbound", "+15550002222", 3);
    alive["availability"] = json!("Alive");
    let records = vec![
        sms(2, "Outbound", "+15550002222", 5),
        sms(1, "Inbound", "+15550002222", 1),
        fax,
        alive,
    ];
    let api = FixtureApi::new(extensions_with_phone(), vec![page(records, None)]);
    let dir = tempdir().unwrap();
    let config = config(dir.path(), OutputFormat::Csv);

    let mut out = Vec::new();
    let harvest = Pipeline::new(&api, &config).run(now(), &mut out).await.unwrap();

    assert_eq!(harvest.all_messages.len(), 3);
    assert_eq!(harvest.deleted.len(), 2);
    assert_eq!(harvest.metrics.discarded_records, 1);
    assert_eq!(harvest.metrics.export_files, 4);

    let transcript = String::from_utf8(out).unwrap();
    assert_eq!(transcript, "\nConversation with +15550002222:\nmessage 1 - received\nmessage 2 - sent\n");

    let rpt = dir.path().join("rpt");
    let mut reader = csv::Reader::from_path(rpt.join("conversations.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "Conversation");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "+15550001111 - +15550002222");
    assert_eq!(&rows[0][1], "1");
    assert_eq!(&rows[1][1], "2");
    assert_eq!(&rows[0][5], "deleted");

    let all = csv::Reader::from_path(rpt.join("all_messages.csv")).unwrap().records().count();
    assert_eq!(all, 3);

    let readable = std::fs::read_to_string(dir.path().join("readable.csv")).unwrap();
    assert!(readable.starts_with("Message,Direction,Status\n"));
    assert!(readable.contains("Conversation with +15550002222,,\n"));
    assert!(readable.contains("message 2,sent,deleted\n"));
}

#[tokio::test]
async fn test_run_without_export_writes_nothing() {
    let api = FixtureApi::new(extensions_with_phone(), vec![page(vec![sms(1, "Inbound", "+1", 0)], None)]);
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), OutputFormat::Xlsx);
    config.export.enabled = false;

    let mut out = Vec::new();
    let harvest = Pipeline::new(&api, &config).run(now(), &mut out).await.unwrap();

    assert_eq!(harvest.metrics.export_files, 0);
    assert!(!dir.path().join("rpt").exists());
    assert!(!dir.path().join("readable.xlsx").exists());
    assert!(String::from_utf8(out).unwrap().contains("Conversation with +1:"));
}
