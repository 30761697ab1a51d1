//! The report pipeline: resolve extension, harvest the message store, export.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::client::ProviderApi;
use crate::config::AppConfig;
use crate::error::Result;
use crate::file_writer::write_reports;
use crate::logging::OperationTimer;
use crate::models::DateWindow;
use crate::paginator::{Harvest, Paginator};
use crate::report::print_conversations;
use crate::resolver::resolve_extension_phone;

/// One report run over an injected provider API
pub struct Pipeline<'a, A: ?Sized> {
    api: &'a A,
    config: &'a AppConfig,
}

impl<'a, A> Pipeline<'a, A>
where
    A: ProviderApi + ?Sized,
{
    /// Pipeline over `api` configured by `config`
    pub const fn new(api: &'a A, config: &'a AppConfig) -> Self {
        Self { api, config }
    }

    /// Resolve the extension and harvest its deleted messages for the
    /// window ending at `now`. Nothing is fetched from the message store if
    /// the extension cannot be resolved.
    pub async fn collect(&self, now: DateTime<Utc>) -> Result<Harvest> {
        let provider = &self.config.provider;

        let timer = OperationTimer::new("resolve_extension");
        let self_phone = resolve_extension_phone(self.api, &provider.extension_id).await?;
        let resolve_ms = timer.finish();

        let window = DateWindow::trailing_days(now, provider.window_days);
        info!(
            date_from = %window.date_from_param(),
            date_to = %window.date_to_param(),
            "Querying message store for deleted messages"
        );

        let timer = OperationTimer::new("fetch_messages");
        let mut harvest = Paginator::new(self.api, provider.extension_id.as_str(), window, provider.per_page)
            .harvest(&self_phone)
            .await?;
        let fetch_ms = timer.finish();

        harvest.metrics.record_phase("resolve", resolve_ms);
        harvest.metrics.record_phase("fetch", fetch_ms);
        Ok(harvest)
    }

    /// Write report files unless export is disabled.
    pub fn export(&self, harvest: &mut Harvest) -> Result<Vec<PathBuf>> {
        let export = &self.config.export;
        if !export.enabled {
            info!("Report export disabled");
            return Ok(Vec::new());
        }

        let timer = OperationTimer::new("export_reports");
        let files = write_reports(harvest, export)?;
        let export_ms = timer.finish();

        harvest.metrics.record_export(export.format.extension(), files.len());
        harvest.metrics.record_phase("export", export_ms);
        Ok(files)
    }

    /// Collect, export, then print the transcript to `out`.
    pub async fn run<W: Write>(&self, now: DateTime<Utc>, out: &mut W) -> Result<Harvest> {
        let mut harvest = self.collect(now).await?;
        self.export(&mut harvest)?;
        print_conversations(&harvest.conversations, out)?;

        info!(
            pages = harvest.metrics.pages_fetched,
            records = harvest.metrics.records_seen,
            deleted = harvest.metrics.deleted_messages,
            files = harvest.metrics.export_files,
            "Run complete"
        );
        Ok(harvest)
    }
}
