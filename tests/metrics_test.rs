//! Unit tests for metrics.rs module

use deleted_sms_report::metrics::HarvestMetrics;

#[test]
fn test_harvest_metrics_default() {
    let metrics = HarvestMetrics::default();
    assert_eq!(metrics.pages_fetched, 0);
    assert_eq!(metrics.records_seen, 0);
    assert_eq!(metrics.text_messages, 0);
    assert_eq!(metrics.discarded_records, 0);
    assert_eq!(metrics.deleted_messages, 0);
    assert_eq!(metrics.export_files, 0);
}

#[test]
fn test_record_page_counts_empty_pages() {
    let mut metrics = HarvestMetrics::default();
    metrics.record_page(100);
    metrics.record_page(50);
    metrics.record_page(0);
    assert_eq!(metrics.pages_fetched, 3);
    assert_eq!(metrics.records_seen, 150);
}

#[test]
fn test_record_text_message() {
    let mut metrics = HarvestMetrics::default();
    metrics.record_text_message(true);
    metrics.record_text_message(false);
    metrics.record_text_message(true);
    assert_eq!(metrics.text_messages, 3);
    assert_eq!(metrics.deleted_messages, 2);
}

#[test]
fn test_record_discarded() {
    let mut metrics = HarvestMetrics::default();
    metrics.record_discarded();
    metrics.record_discarded();
    assert_eq!(metrics.discarded_records, 2);
    assert_eq!(metrics.text_messages, 0);
}

#[test]
fn test_record_export_accumulates() {
    let mut metrics = HarvestMetrics::default();
    metrics.record_export("xlsx", 4);
    metrics.record_export("csv", 1);
    assert_eq!(metrics.export_files, 5);
}

#[test]
fn test_record_phase_without_exporter() {
    let metrics = HarvestMetrics::default();
    metrics.record_phase("fetch", 1500);
    metrics.record_phase("export", u128::MAX);
    assert_eq!(metrics, HarvestMetrics::default());
}
