use std::io::Write;

use crate::conversations::ConversationBook;

/// Print each conversation as `<text> - sent|received` lines under a
/// `Conversation with <number>:` heading.
pub fn print_conversations<W: Write>(book: &ConversationBook, out: &mut W) -> std::io::Result<()> {
    let conversations = book.sorted();
    if conversations.is_empty() {
        writeln!(out, "No deleted messages found in conversations.")?;
        return out.flush();
    }

    for conversation in conversations {
        writeln!(out)?;
        writeln!(out, "Conversation with {}:", conversation.counterpart)?;
        for message in conversation.messages {
            writeln!(out, "{} - {}", message.subject, message.direction.label())?;
        }
    }

    out.flush()
}
