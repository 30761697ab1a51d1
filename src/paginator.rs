//! Message-store pagination and harvesting of deleted conversations.

use tracing::{debug, info};

use crate::client::ProviderApi;
use crate::conversations::{classify, ConversationBook};
use crate::error::Result;
use crate::metrics::HarvestMetrics;
use crate::models::{DateWindow, MessageQuery, MessageRecord, RawMessage};

/// Cursor of the first page.
pub const FIRST_PAGE: &str = "1";

/// Everything collected in one paginated run
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Resolved phone number of the extension
    pub self_phone: String,
    /// Every SMS/Text record, deleted or not
    pub all_messages: Vec<MessageRecord>,
    /// Deleted SMS/Text records in fetch order
    pub deleted: Vec<MessageRecord>,
    /// Deleted records grouped by counterpart
    pub conversations: ConversationBook,
    /// Counters for the run
    pub metrics: HarvestMetrics,
}

impl Harvest {
    /// Start an empty harvest for `self_phone`
    #[must_use]
    pub fn new(self_phone: impl Into<String>) -> Self {
        Self {
            self_phone: self_phone.into(),
            ..Self::default()
        }
    }

    /// Normalize and absorb one wire record.
    ///
    /// Anything that is not SMS or Text is discarded before its other fields
    /// are parsed, so a malformed `creationTime` only fails the run when it
    /// sits on a text message.
    pub fn absorb_raw(&mut self, raw: RawMessage) -> Result<()> {
        if !raw.is_text_message() {
            self.metrics.record_discarded();
            return Ok(());
        }
        self.absorb(MessageRecord::try_from(raw)?);
        Ok(())
    }

    /// Classify and store one normalized record
    pub fn absorb(&mut self, record: MessageRecord) {
        let Some(classified) = classify(record, &self.self_phone) else {
            self.metrics.record_discarded();
            return;
        };

        // The request already asks for Deleted only; the provider's filter
        // is not relied on.
        let deleted = classified.record.availability.is_deleted();
        self.metrics.record_text_message(deleted);
        self.all_messages.push(classified.record.clone());
        if deleted {
            self.deleted.push(classified.record.clone());
            self.conversations.insert(classified.counterpart, classified.record);
        }
    }
}

/// Walks the message store of one extension page by page
pub struct Paginator<'a, A: ?Sized> {
    api: &'a A,
    extension_id: String,
    window: DateWindow,
    per_page: u32,
}

impl<'a, A> Paginator<'a, A>
where
    A: ProviderApi + ?Sized,
{
    /// Paginator over `window` with `per_page` records per request
    pub fn new(api: &'a A, extension_id: impl Into<String>, window: DateWindow, per_page: u32) -> Self {
        Self {
            api,
            extension_id: extension_id.into(),
            window,
            per_page,
        }
    }

    /// Fetch every page and classify its records.
    ///
    /// Stops on the first empty page or on a page without `nextPageId`.
    /// Any fetch or decode failure aborts the whole run.
    pub async fn harvest(&self, self_phone: &str) -> Result<Harvest> {
        let mut harvest = Harvest::new(self_phone);
        let mut query = MessageQuery {
            extension_id: self.extension_id.clone(),
            window: self.window,
            page: FIRST_PAGE.to_string(),
            per_page: self.per_page,
        };

        loop {
            debug!(page = %query.page, "Fetching message page");
            let page = self.api.list_messages(&query).await?;
            harvest.metrics.record_page(page.records.len());

            if page.records.is_empty() {
                debug!(page = %query.page, "Empty page, stopping");
                break;
            }

            for raw in page.records {
                harvest.absorb_raw(raw)?;
            }

            match page.paging.next_page_id {
                Some(next) => query.page = next,
                None => break,
            }
        }

        info!(
            pages = harvest.metrics.pages_fetched,
            text_messages = harvest.all_messages.len(),
            deleted = harvest.deleted.len(),
            conversations = harvest.conversations.len(),
            "Message store harvested"
        );
        Ok(harvest)
    }
}
