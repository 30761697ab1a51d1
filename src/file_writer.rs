//! File writing utilities for report export.
//!
//! Writes the four report files (all messages, deleted messages, grouped
//! conversations, readable transcript) as XLSX workbooks, or as CSV/JSON when
//! another [`OutputFormat`] is configured.

use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::Writer;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tracing::info;

use crate::config::ExportConfig;
use crate::conversations::Conversation;
use crate::error::Result;
use crate::models::{MessageRecord, OutputFormat};
use crate::paginator::Harvest;

/// Status written for every row of the grouped reports.
pub const DELETED_STATUS: &str = "deleted";

/// Sheet name of `all_messages.xlsx`, shared with the deleted-only report
pub const ALL_MESSAGES_SHEET: &str = DELETED_MESSAGES_SHEET;
/// Sheet name of `deleted_messages.xlsx`
pub const DELETED_MESSAGES_SHEET: &str = "Deleted Messages";
/// Sheet name of `conversations.xlsx`
pub const CONVERSATIONS_SHEET: &str = "Conversations";
/// Sheet name of the readable transcript workbook
pub const READABLE_SHEET: &str = "Readable Conversations";

/// A row type that can be laid out as a table.
pub trait TableRow: Serialize {
    /// Column headers, in cell order
    const HEADERS: &'static [&'static str];

    /// Cell values, in header order
    fn cells(&self) -> Vec<&str>;
}

/// Row of the flat message reports
#[derive(Debug, Serialize)]
pub struct MessageRow<'a> {
    #[serde(rename = "MessageID")]
    message_id: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Text")]
    text: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Type")]
    message_type: &'a str,
    #[serde(rename = "Availability")]
    availability: &'a str,
    #[serde(rename = "ConversationID")]
    conversation_id: &'a str,
    #[serde(rename = "Direction")]
    direction: &'a str,
}

impl<'a> From<&'a MessageRecord> for MessageRow<'a> {
    fn from(m: &'a MessageRecord) -> Self {
        Self {
            message_id: &m.id,
            from: &m.from_phone,
            to: &m.to_phone,
            text: &m.subject,
            status: &m.message_status,
            date: &m.creation_time_raw,
            message_type: m.message_type.as_str(),
            availability: m.availability.as_str(),
            conversation_id: &m.conversation_id,
            direction: m.direction.as_str(),
        }
    }
}

impl TableRow for MessageRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "MessageID",
        "From",
        "To",
        "Text",
        "Status",
        "Date",
        "Type",
        "Availability",
        "ConversationID",
        "Direction",
    ];

    fn cells(&self) -> Vec<&str> {
        vec![
            self.message_id,
            self.from,
            self.to,
            self.text,
            self.status,
            self.date,
            self.message_type,
            self.availability,
            self.conversation_id,
            self.direction,
        ]
    }
}

/// Row of the grouped conversations report
#[derive(Debug, Serialize)]
pub struct ConversationRow<'a> {
    #[serde(rename = "Conversation")]
    conversation: String,
    #[serde(rename = "MessageID")]
    message_id: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Text")]
    text: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Type")]
    message_type: &'a str,
    #[serde(rename = "Availability")]
    availability: &'a str,
    #[serde(rename = "Direction")]
    direction: &'a str,
}

impl<'a> ConversationRow<'a> {
    fn new(self_phone: &str, counterpart: &str, m: &'a MessageRecord) -> Self {
        Self {
            conversation: format!("{self_phone} - {counterpart}"),
            message_id: &m.id,
            from: &m.from_phone,
            to: &m.to_phone,
            text: &m.subject,
            status: DELETED_STATUS,
            date: &m.creation_time_raw,
            message_type: m.message_type.as_str(),
            availability: m.availability.as_str(),
            direction: m.direction.as_str(),
        }
    }
}

impl TableRow for ConversationRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Conversation",
        "MessageID",
        "From",
        "To",
        "Text",
        "Status",
        "Date",
        "Type",
        "Availability",
        "Direction",
    ];

    fn cells(&self) -> Vec<&str> {
        vec![
            self.conversation.as_str(),
            self.message_id,
            self.from,
            self.to,
            self.text,
            self.status,
            self.date,
            self.message_type,
            self.availability,
            self.direction,
        ]
    }
}

/// Rows of the grouped conversations report, bucket by bucket
#[must_use]
pub fn conversation_rows<'a>(self_phone: &str, conversations: &[Conversation<'a>]) -> Vec<ConversationRow<'a>> {
    conversations
        .iter()
        .flat_map(|c| c.messages.iter().map(move |&m| ConversationRow::new(self_phone, c.counterpart, m)))
        .collect()
}

/// Write every report for `harvest` according to `config`.
///
/// Tabular reports without rows are skipped; the readable transcript is
/// always written.
///
/// # Returns
///
/// Paths of the files that were written
pub fn write_reports(harvest: &Harvest, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    let format = config.format;
    let output_dir = Path::new(&config.output_directory);
    create_dir_all(output_dir)?;

    let mut written = Vec::new();
    let report_path = |stem: &str| output_dir.join(format!("{stem}.{}", format.extension()));

    let all_rows: Vec<MessageRow<'_>> = harvest.all_messages.iter().map(MessageRow::from).collect();
    if all_rows.is_empty() {
        info!("No messages found.");
    } else {
        let path = report_path("all_messages");
        write_table(&all_rows, ALL_MESSAGES_SHEET, format, &path)?;
        info!(path = %path.display(), rows = all_rows.len(), "Report saved");
        written.push(path);
    }

    let deleted_rows: Vec<MessageRow<'_>> = harvest.deleted.iter().map(MessageRow::from).collect();
    if deleted_rows.is_empty() {
        info!("No deleted messages found.");
    } else {
        info!("Found {} deleted messages.", deleted_rows.len());
        let path = report_path("deleted_messages");
        write_table(&deleted_rows, DELETED_MESSAGES_SHEET, format, &path)?;
        info!(path = %path.display(), rows = deleted_rows.len(), "Report saved");
        written.push(path);
    }

    let conversations = harvest.conversations.sorted();
    let grouped_rows = conversation_rows(&harvest.self_phone, &conversations);
    if grouped_rows.is_empty() {
        info!("No conversations found.");
    } else {
        let path = report_path("conversations");
        write_table(&grouped_rows, CONVERSATIONS_SHEET, format, &path)?;
        info!(path = %path.display(), rows = grouped_rows.len(), "Report saved");
        written.push(path);
    }

    let readable_path = Path::new(&config.readable_path).with_extension(format.extension());
    if let Some(parent) = readable_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    write_readable(&conversations, format, &readable_path)?;
    info!(path = %readable_path.display(), "Readable transcript saved");
    written.push(readable_path);

    Ok(written)
}

/// Write `rows` to `file_path` in `format`.
pub fn write_table<R: TableRow>(rows: &[R], sheet_name: &str, format: OutputFormat, file_path: &Path) -> Result<()> {
    match format {
        OutputFormat::Xlsx => write_xlsx_table(rows, sheet_name, file_path),
        OutputFormat::Csv => write_csv_table(rows, file_path),
        OutputFormat::Json => write_json(rows, file_path),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_xlsx_table<R: TableRow>(rows: &[R], sheet_name: &str, file_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in R::HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.cells().into_iter().enumerate() {
            worksheet.write_string((i + 1) as u32, col as u16, cell)?;
        }
    }

    workbook.save(file_path)?;
    Ok(())
}

/// Header row comes from the serde field names.
fn write_csv_table<R: TableRow>(rows: &[R], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(value: &T, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReadableLine<'a> {
    text: &'a str,
    direction: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ReadableConversation<'a> {
    conversation: String,
    messages: Vec<ReadableLine<'a>>,
}

fn readable_conversations<'a>(conversations: &[Conversation<'a>]) -> Vec<ReadableConversation<'a>> {
    conversations
        .iter()
        .map(|c| ReadableConversation {
            conversation: format!("Conversation with {}", c.counterpart),
            messages: c
                .messages
                .iter()
                .map(|&m| ReadableLine {
                    text: &m.subject,
                    direction: m.direction.label(),
                    status: DELETED_STATUS,
                })
                .collect(),
        })
        .collect()
}

/// Write the human-readable transcript.
///
/// Layout: a `Message, Direction, Status` header, then per counterpart a bold
/// `Conversation with <number>` row, one row per message and a blank row.
pub fn write_readable(conversations: &[Conversation<'_>], format: OutputFormat, file_path: &Path) -> Result<()> {
    let blocks = readable_conversations(conversations);
    match format {
        OutputFormat::Xlsx => write_readable_xlsx(&blocks, file_path),
        OutputFormat::Csv => write_readable_csv(&blocks, file_path),
        OutputFormat::Json => write_json(&blocks, file_path),
    }
}

fn write_readable_xlsx(blocks: &[ReadableConversation<'_>], file_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(READABLE_SHEET)?;

    worksheet.write_string(0, 0, "Message")?;
    worksheet.write_string(0, 1, "Direction")?;
    worksheet.write_string(0, 2, "Status")?;

    let mut row: u32 = 1;
    for block in blocks {
        worksheet.write_string_with_format(row, 0, &block.conversation, &bold)?;
        row += 1;

        for line in &block.messages {
            worksheet.write_string(row, 0, line.text)?;
            worksheet.write_string(row, 1, line.direction)?;
            worksheet.write_string(row, 2, line.status)?;
            row += 1;
        }

        row += 1; // Empty row
    }

    workbook.save(file_path)?;
    Ok(())
}

fn write_readable_csv(blocks: &[ReadableConversation<'_>], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["Message", "Direction", "Status"])?;
    for block in blocks {
        writer.write_record([block.conversation.as_str(), "", ""])?;
        for line in &block.messages {
            writer.write_record([line.text, line.direction, line.status])?;
        }
        writer.write_record(["", "", ""])?;
    }

    writer.flush()?;
    Ok(())
}
