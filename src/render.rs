//! Output rendering.
//!
//! Structured output is the whole envelope as pretty JSON. Tabular output
//! flattens each communication section to the same six columns; the variants
//! differ only in delimiter and quoting. Rendering never re-derives data.

use csv::WriterBuilder;
use tracing::warn;

use crate::error::Result;
use crate::models::{RecordKind, RenderFormat};
use crate::records::{AttachmentRecord, DataSections, DraftRecord, HiddenMessageRecord, MessageRecord, RunEnvelope};

/// Column names of every tabular rendering
pub const HEADER: [&str; 6] = ["GUID", "MESSAGE", "DATE", "SERVICE", "SENDER", "RECEIVER"];

/// One flattened row, in [`HEADER`] order
pub type TabularRow = [String; 6];

/// A section flattened for tabular output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularSection {
    /// Section the rows belong to
    pub kind: RecordKind,
    /// Flattened rows
    pub rows: Vec<TabularRow>,
}

/// Render an envelope in the requested format.
pub fn render(envelope: &RunEnvelope, format: RenderFormat) -> Result<String> {
    if format.is_structured() {
        return Ok(serde_json::to_string_pretty(envelope)?);
    }

    for kind in [RecordKind::Contacts, RecordKind::Threads] {
        if envelope.data.count(kind).is_some() {
            warn!(section = %kind, format = format.name(), "Section has no tabular form; skipped");
        }
    }

    let mut blocks = Vec::new();
    for section in tabular_sections(&envelope.data) {
        let block = render_block(&section, format)?;
        if !block.is_empty() {
            blocks.push(block);
        }
    }
    Ok(blocks.join("\n\n"))
}

/// Flatten every present section that has a tabular projection, in output order.
#[must_use]
pub fn tabular_sections(data: &DataSections) -> Vec<TabularSection> {
    let mut sections = Vec::new();
    if let Some(records) = &data.messages {
        sections.push(TabularSection { kind: RecordKind::Messages, rows: records.iter().map(message_row).collect() });
    }
    if let Some(records) = &data.attachments {
        sections
            .push(TabularSection { kind: RecordKind::Attachments, rows: records.iter().map(attachment_row).collect() });
    }
    if let Some(records) = &data.hidden_messages {
        sections
            .push(TabularSection { kind: RecordKind::HiddenMessages, rows: records.iter().map(hidden_row).collect() });
    }
    if let Some(records) = &data.drafts {
        sections.push(TabularSection { kind: RecordKind::Drafts, rows: records.iter().map(draft_row).collect() });
    }
    if let Some(records) = &data.search {
        sections.push(TabularSection { kind: RecordKind::Search, rows: records.iter().map(message_row).collect() });
    }
    sections
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn message_row(record: &MessageRecord) -> TabularRow {
    [
        cell(record.guid.as_deref()),
        cell(record.content.text.as_deref()),
        cell(record.timestamps.date.as_deref()),
        cell(record.communication.channel.service.as_deref()),
        record.communication.sender.display().to_string(),
        record.communication.receiver.display().to_string(),
    ]
}

fn attachment_row(record: &AttachmentRecord) -> TabularRow {
    let name = record.metadata.transfer_name.as_deref().or(record.metadata.filename.as_deref());
    [
        cell(record.guid.as_deref()),
        cell(name),
        cell(record.created_date.as_deref()),
        String::new(),
        record.message.communication.sender.display().to_string(),
        record.message.communication.receiver.display().to_string(),
    ]
}

fn hidden_row(record: &HiddenMessageRecord) -> TabularRow {
    [
        cell(record.guid.as_deref()),
        cell(record.content.text.as_deref()),
        cell(record.timeline.date.as_deref()),
        cell(record.context.service.as_deref()),
        record.communication.sender.display().to_string(),
        record.communication.receiver.display().to_string(),
    ]
}

fn draft_row(record: &DraftRecord) -> TabularRow {
    [
        record.draft_id.clone(),
        record.content.data.text.clone(),
        cell(record.status.state.created.as_deref()),
        record.communication.receiver.service.clone(),
        String::new(),
        record.communication.receiver.account.clone(),
    ]
}

fn render_block(section: &TabularSection, format: RenderFormat) -> Result<String> {
    Ok(match format {
        RenderFormat::Json => String::new(),
        RenderFormat::Line => delimited(section, '\t'),
        RenderFormat::List => delimited(section, '|'),
        RenderFormat::Csv => csv_block(section)?,
        RenderFormat::Column => column_block(section),
        RenderFormat::Html => html_block(section),
        RenderFormat::Insert => insert_block(section),
    })
}

/// Escape a cell for the unquoted formats so a record stays on one line.
///
/// Backslash, line breaks, tabs and `delimiter` become backslash escapes.
#[must_use]
pub fn escape_cell(value: &str, delimiter: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ if ch == delimiter => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Split one `line` or `list` output line back into unescaped cells.
#[must_use]
pub fn split_delimited(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some('t') => current.push('\t'),
                Some(other) => current.push(other),
                None => current.push('\\'),
            },
            _ if ch == delimiter => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

fn delimited(section: &TabularSection, delimiter: char) -> String {
    let separator = delimiter.to_string();
    let mut lines = vec![HEADER.join(&separator)];
    for row in &section.rows {
        let cells: Vec<String> = row.iter().map(|value| escape_cell(value, delimiter)).collect();
        lines.push(cells.join(&separator));
    }
    lines.join("\n")
}

fn csv_block(section: &TabularSection) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in &section.rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    let text = String::from_utf8(bytes)?;
    Ok(text.trim_end_matches('\n').to_string())
}

fn column_block(section: &TabularSection) -> String {
    // columns are space-padded, so only line breaks and tabs need escaping
    let rows: Vec<TabularRow> =
        section.rows.iter().map(|row| row.each_ref().map(|value| escape_cell(value, '\t'))).collect();

    let mut widths = HEADER.map(|name| name.chars().count());
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let format_line = |cells: [&str; 6]| {
        cells
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(HEADER)];
    lines.extend(rows.iter().map(|row| format_line(row.each_ref().map(String::as_str))));
    lines.join("\n")
}

/// Escape text for an HTML table cell
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn html_block(section: &TabularSection) -> String {
    let header: String = HEADER.iter().map(|name| format!("<TH>{name}</TH>")).collect();
    let mut lines = vec![format!("<TR>{header}</TR>")];
    for row in &section.rows {
        let cells: String = row.iter().map(|value| format!("<TD>{}</TD>", escape_html(value))).collect();
        lines.push(format!("<TR>{cells}</TR>"));
    }
    lines.join("\n")
}

/// Quote a value as an SQL string literal
#[must_use]
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn insert_block(section: &TabularSection) -> String {
    let columns = HEADER.join(",");
    section
        .rows
        .iter()
        .map(|row| {
            let values = row.iter().map(|value| sql_literal(value)).collect::<Vec<_>>().join(",");
            format!("INSERT INTO \"{}\"({columns}) VALUES({values});", section.kind.section_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
