//! Conversation classification and grouping
//!
//! Records are bucketed by counterpart phone number: the recipient for
//! outbound messages, the sender otherwise. Buckets are unordered while they
//! are filled and sorted by parsed creation time when read.

use std::collections::BTreeMap;

use crate::models::MessageRecord;

/// A message that passed the SMS/Text filter, with its counterpart resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Phone number on the non-self side of the exchange
    pub counterpart: String,
    /// The record, with an empty sender replaced by the self number
    pub record: MessageRecord,
}

/// Classify one record against the resolved self number.
///
/// Returns `None` for anything that is not SMS or Text; such records never
/// reach the deleted filter.
#[must_use]
pub fn classify(mut record: MessageRecord, self_phone: &str) -> Option<Classified> {
    if record.from_phone.is_empty() {
        record.from_phone = self_phone.to_string();
    }

    if !record.message_type.is_text_message() {
        return None;
    }

    let counterpart = if record.direction.is_outbound() {
        record.to_phone.clone()
    } else {
        record.from_phone.clone()
    };

    Some(Classified { counterpart, record })
}

/// One counterpart's messages in ascending creation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation<'a> {
    /// Counterpart phone number
    pub counterpart: &'a str,
    /// Messages sorted by creation time
    pub messages: Vec<&'a MessageRecord>,
}

/// Deleted messages grouped by counterpart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationBook {
    buckets: BTreeMap<String, Vec<MessageRecord>>,
}

impl ConversationBook {
    /// Empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the counterpart's bucket
    pub fn insert(&mut self, counterpart: String, record: MessageRecord) {
        self.buckets.entry(counterpart).or_default().push(record);
    }

    /// Number of counterparts
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when no message was bucketed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total messages over all buckets
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Raw bucket in insertion order
    #[must_use]
    pub fn bucket(&self, counterpart: &str) -> Option<&[MessageRecord]> {
        self.buckets.get(counterpart).map(Vec::as_slice)
    }

    /// Counterparts in ascending order
    pub fn counterparts(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Non-empty conversations, counterparts ascending, messages sorted by
    /// creation time. Equal timestamps keep fetch order.
    #[must_use]
    pub fn sorted(&self) -> Vec<Conversation<'_>> {
        self.buckets
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(counterpart, messages)| {
                let mut messages: Vec<&MessageRecord> = messages.iter().collect();
                messages.sort_by_key(|m| m.creation_time);
                Conversation {
                    counterpart: counterpart.as_str(),
                    messages,
                }
            })
            .collect()
    }
}
