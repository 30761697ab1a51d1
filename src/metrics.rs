use std::time::Duration;

/// Pages requested from the message store
pub const PAGES_FETCHED: &str = "deleted_sms_pages_fetched_total";
/// Records returned by the provider, any type
pub const RECORDS_SEEN: &str = "deleted_sms_records_seen_total";
/// SMS/Text records kept
pub const TEXT_MESSAGES: &str = "deleted_sms_text_messages_total";
/// Records dropped by the type filter
pub const DISCARDED_RECORDS: &str = "deleted_sms_discarded_records_total";
/// Records that passed the deleted gate
pub const DELETED_MESSAGES: &str = "deleted_sms_deleted_messages_total";
/// Report files written
pub const EXPORT_FILES: &str = "deleted_sms_export_files_total";
/// Duration of a whole pipeline phase
pub const PHASE_DURATION: &str = "deleted_sms_phase_duration_seconds";

/// Counters for one run
///
/// Every update is mirrored to the `metrics` facade, which is a no-op unless
/// an exporter is installed. The local copy feeds the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestMetrics {
    /// Pages requested
    pub pages_fetched: u64,
    /// Records returned
    pub records_seen: u64,
    /// SMS/Text records
    pub text_messages: u64,
    /// Non-SMS/Text records
    pub discarded_records: u64,
    /// Deleted SMS/Text records
    pub deleted_messages: u64,
    /// Report files written
    pub export_files: u64,
}

impl HarvestMetrics {
    /// Record one fetched page holding `records` records
    pub fn record_page(&mut self, records: usize) {
        let records = records as u64;
        self.pages_fetched += 1;
        self.records_seen += records;
        ::metrics::counter!(PAGES_FETCHED).increment(1);
        ::metrics::counter!(RECORDS_SEEN).increment(records);
    }

    /// Record a record dropped by the type filter
    pub fn record_discarded(&mut self) {
        self.discarded_records += 1;
        ::metrics::counter!(DISCARDED_RECORDS).increment(1);
    }

    /// Record an SMS/Text record and whether it was deleted
    pub fn record_text_message(&mut self, deleted: bool) {
        self.text_messages += 1;
        ::metrics::counter!(TEXT_MESSAGES).increment(1);
        if deleted {
            self.deleted_messages += 1;
            ::metrics::counter!(DELETED_MESSAGES).increment(1);
        }
    }

    /// Record report files written in `format`
    pub fn record_export(&mut self, format: &str, files: usize) {
        let files = files as u64;
        self.export_files += files;
        ::metrics::counter!(EXPORT_FILES, "format" => format.to_string()).increment(files);
    }

    /// Record how long a phase took, as reported by `OperationTimer::finish`
    pub fn record_phase(&self, phase: &'static str, duration_ms: u128) {
        let seconds = Duration::from_millis(u64::try_from(duration_ms).unwrap_or(u64::MAX)).as_secs_f64();
        ::metrics::histogram!(PHASE_DURATION, "phase" => phase).record(seconds);
    }
}
