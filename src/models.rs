//! Data models for raw store rows and extraction requests
//!
//! This module contains the shapes data has *before* normalization: the untyped
//! [`RawRow`] handed back by a [`crate::db::QueryExecutor`], the typed row views
//! built from it, and the request-side types (record kinds, date filters and
//! output formats). The canonical, normalized shapes live in [`crate::records`].

use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::schema::{attachment, chat, contact, handle, hidden, message};
use crate::timestamp::{raw_windows_for_unix_span, unix_at_end_of, unix_at_start_of};

/// A single raw row: column name to SQLite value.
///
/// Accessors are best-effort: a missing column, a `NULL`, or a value of an
/// unexpected type reads as `None` (or `false` for flags) rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    columns: HashMap<String, Value>,
}

impl RawRow {
    /// Create an empty row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.columns.insert(name.into(), value);
    }

    /// Builder-style integer column
    #[must_use]
    pub fn with_int(mut self, name: &str, value: i64) -> Self {
        self.insert(name, Value::Integer(value));
        self
    }

    /// Builder-style text column
    #[must_use]
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.insert(name, Value::Text(value.to_string()));
        self
    }

    /// Builder-style `NULL` column
    #[must_use]
    pub fn with_null(mut self, name: &str) -> Self {
        self.insert(name, Value::Null);
        self
    }

    /// Raw access to a column value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    /// Number of columns in the row
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Read a column as an integer.
    ///
    /// Reals are truncated and numeric text is parsed; anything else is `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.columns.get(name)? {
            Value::Integer(value) => Some(*value),
            Value::Real(value) if value.is_finite() => Some(value.trunc() as i64),
            Value::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read a column as text. Numbers are stringified; blobs must be UTF-8.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        match self.columns.get(name)? {
            Value::Text(text) => Some(text.clone()),
            Value::Integer(value) => Some(value.to_string()),
            Value::Real(value) => Some(value.to_string()),
            Value::Blob(bytes) => String::from_utf8(bytes.clone()).ok(),
            Value::Null => None,
        }
    }

    /// Read a column as a boolean flag: any non-zero integer is `true`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.int(name).is_some_and(|value| value != 0)
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { columns: iter.into_iter().collect() }
    }
}

/// One row of the handle table, as loaded into the session directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleEntry {
    /// Internal row identifier
    pub row_id: i64,
    /// External contact identifier (phone number or email)
    pub identifier: Option<String>,
    /// Country code the handle was registered with
    pub country: Option<String>,
}

impl HandleEntry {
    /// Build from a raw handle row; rows without a row id are unusable.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Option<Self> {
        Some(Self {
            row_id: row.int(handle::ROWID)?,
            identifier: row.text(handle::ID),
            country: row.text(handle::COUNTRY),
        })
    }
}

/// A message row joined with its chat.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MessageRow {
    /// Message row id
    pub row_id: Option<i64>,
    /// Globally unique identifier
    pub guid: Option<String>,
    /// Message body
    pub text: Option<String>,
    /// Transport service (`iMessage`, `SMS`)
    pub service: Option<String>,
    /// Counterparty handle row id
    pub handle_id: Option<i64>,
    /// Sent by the local account
    pub is_from_me: bool,
    /// Local account identifier
    pub destination_caller_id: Option<String>,
    /// Message format version
    pub version: Option<i64>,
    /// When the message was sent
    pub date: Option<i64>,
    /// When it was read
    pub date_read: Option<i64>,
    /// When it was delivered
    pub date_delivered: Option<i64>,
    /// When audio or video was played
    pub date_played: Option<i64>,
    /// When it was unsent
    pub date_retracted: Option<i64>,
    /// When it was last edited
    pub date_edited: Option<i64>,
    /// Subject line
    pub subject: Option<String>,
    /// Group name set by this message
    pub group_title: Option<String>,
    /// Message a reaction or tapback refers to
    pub associated_message_guid: Option<String>,
    /// Message this replies to
    pub reply_to_guid: Option<String>,
    /// First message of the inline reply thread
    pub thread_originator_guid: Option<String>,
    /// Identifier of the owning chat
    pub chat_identifier: Option<String>,
    /// Delivered
    pub is_delivered: bool,
    /// Read by the recipient
    pub is_read: bool,
    /// Sent
    pub is_sent: bool,
    /// Media played
    pub is_played: bool,
    /// Prepared for sending
    pub is_prepared: bool,
    /// Finished processing
    pub is_finished: bool,
    /// Has no content
    pub is_empty: bool,
    /// Archived
    pub is_archive: bool,
    /// Filtered as spam
    pub is_spam: bool,
    /// Flagged corrupt by the store
    pub is_corrupt: bool,
    /// Expires after being read
    pub is_expirable: bool,
    /// System notice
    pub is_system_message: bool,
    /// Service notice
    pub is_service_message: bool,
    /// Forwarded
    pub is_forward: bool,
    /// Voice message
    pub is_audio_message: bool,
    /// Emote
    pub is_emote: bool,
    /// Data detectors ran on the text
    pub was_data_detected: bool,
    /// Delivered without notification
    pub was_delivered_quietly: bool,
    /// Expired and removed
    pub was_detonated: bool,
    /// iCloud sync state
    pub ck_sync_state: Option<i64>,
    /// iCloud record id
    pub ck_record_id: Option<String>,
    /// iCloud record change tag
    pub ck_record_change_tag: Option<String>,
}

impl MessageRow {
    /// Map a raw row, degrading malformed fields to `None`/`false`.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            row_id: row.int(message::ROWID),
            guid: row.text(message::GUID),
            text: row.text(message::TEXT),
            service: row.text(message::SERVICE),
            handle_id: row.int(message::HANDLE_ID),
            is_from_me: row.flag(message::IS_FROM_ME),
            destination_caller_id: row.text(message::DESTINATION_CALLER_ID),
            version: row.int(message::VERSION),
            date: row.int(message::DATE),
            date_read: row.int(message::DATE_READ),
            date_delivered: row.int(message::DATE_DELIVERED),
            date_played: row.int(message::DATE_PLAYED),
            date_retracted: row.int(message::DATE_RETRACTED),
            date_edited: row.int(message::DATE_EDITED),
            subject: row.text(message::SUBJECT),
            group_title: row.text(message::GROUP_TITLE),
            associated_message_guid: row.text(message::ASSOCIATED_MESSAGE_GUID),
            reply_to_guid: row.text(message::REPLY_TO_GUID),
            thread_originator_guid: row.text(message::THREAD_ORIGINATOR_GUID),
            chat_identifier: row.text(message::CHAT_IDENTIFIER),
            is_delivered: row.flag(message::IS_DELIVERED),
            is_read: row.flag(message::IS_READ),
            is_sent: row.flag(message::IS_SENT),
            is_played: row.flag(message::IS_PLAYED),
            is_prepared: row.flag(message::IS_PREPARED),
            is_finished: row.flag(message::IS_FINISHED),
            is_empty: row.flag(message::IS_EMPTY),
            is_archive: row.flag(message::IS_ARCHIVE),
            is_spam: row.flag(message::IS_SPAM),
            is_corrupt: row.flag(message::IS_CORRUPT),
            is_expirable: row.flag(message::IS_EXPIRABLE),
            is_system_message: row.flag(message::IS_SYSTEM_MESSAGE),
            is_service_message: row.flag(message::IS_SERVICE_MESSAGE),
            is_forward: row.flag(message::IS_FORWARD),
            is_audio_message: row.flag(message::IS_AUDIO_MESSAGE),
            is_emote: row.flag(message::IS_EMOTE),
            was_data_detected: row.flag(message::WAS_DATA_DETECTED),
            was_delivered_quietly: row.flag(message::WAS_DELIVERED_QUIETLY),
            was_detonated: row.flag(message::WAS_DETONATED),
            ck_sync_state: row.int(message::CK_SYNC_STATE),
            ck_record_id: row.text(message::CK_RECORD_ID),
            ck_record_change_tag: row.text(message::CK_RECORD_CHANGE_TAG),
        }
    }
}

/// An attachment row joined with its parent message.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AttachmentRow {
    /// Attachment row id
    pub row_id: Option<i64>,
    /// Attachment guid
    pub guid: Option<String>,
    /// When the attachment was created
    pub created_date: Option<i64>,
    /// Path on disk
    pub filename: Option<String>,
    /// MIME type
    pub mime_type: Option<String>,
    /// Uniform type identifier
    pub uti: Option<String>,
    /// Original file name
    pub transfer_name: Option<String>,
    /// Size in bytes
    pub total_bytes: Option<i64>,
    /// Transfer progress code
    pub transfer_state: Option<i64>,
    /// Sent by the local account
    pub is_outgoing: bool,
    /// Sticker
    pub is_sticker: bool,
    /// Hidden from the transcript
    pub hide_attachment: bool,
    /// Flagged by communication safety
    pub is_commsafety_sensitive: bool,
    /// iCloud sync state
    pub ck_sync_state: Option<i64>,
    /// Guid before any re-upload
    pub original_guid: Option<String>,
    /// iCloud record id
    pub ck_record_id: Option<String>,
    /// Counterparty of the parent message
    pub handle_id: Option<i64>,
    /// Parent sent by the local account
    pub is_from_me: bool,
    /// Local account of the parent message
    pub destination_caller_id: Option<String>,
    /// Parent delivered
    pub is_delivered: bool,
    /// Parent read
    pub is_read: bool,
    /// Parent sent
    pub is_sent: bool,
    /// Parent has no content
    pub is_empty: bool,
    /// Delivery delayed
    pub is_delayed: bool,
    /// Automatic reply
    pub is_auto_reply: bool,
    /// Prepared for sending
    pub is_prepared: bool,
    /// Finished processing
    pub is_finished: bool,
    /// Filtered as spam
    pub is_spam: bool,
    /// Key transparency verified
    pub is_kt_verified: bool,
}

impl AttachmentRow {
    /// Map a raw row, degrading malformed fields to `None`/`false`.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            row_id: row.int(attachment::ROWID),
            guid: row.text(attachment::GUID),
            created_date: row.int(attachment::CREATED_DATE),
            filename: row.text(attachment::FILENAME),
            mime_type: row.text(attachment::MIME_TYPE),
            uti: row.text(attachment::UTI),
            transfer_name: row.text(attachment::TRANSFER_NAME),
            total_bytes: row.int(attachment::TOTAL_BYTES),
            transfer_state: row.int(attachment::TRANSFER_STATE),
            is_outgoing: row.flag(attachment::IS_OUTGOING),
            is_sticker: row.flag(attachment::IS_STICKER),
            hide_attachment: row.flag(attachment::HIDE_ATTACHMENT),
            is_commsafety_sensitive: row.flag(attachment::IS_COMMSAFETY_SENSITIVE),
            ck_sync_state: row.int(attachment::CK_SYNC_STATE),
            original_guid: row.text(attachment::ORIGINAL_GUID),
            ck_record_id: row.text(attachment::CK_RECORD_ID),
            handle_id: row.int(message::HANDLE_ID),
            is_from_me: row.flag(message::IS_FROM_ME),
            destination_caller_id: row.text(message::DESTINATION_CALLER_ID),
            is_delivered: row.flag(message::IS_DELIVERED),
            is_read: row.flag(message::IS_READ),
            is_sent: row.flag(message::IS_SENT),
            is_empty: row.flag(message::IS_EMPTY),
            is_delayed: row.flag(message::IS_DELAYED),
            is_auto_reply: row.flag(message::IS_AUTO_REPLY),
            is_prepared: row.flag(message::IS_PREPARED),
            is_finished: row.flag(message::IS_FINISHED),
            is_spam: row.flag(message::IS_SPAM),
            is_kt_verified: row.flag(message::IS_KT_VERIFIED),
        }
    }
}

/// A recoverable message row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenMessageRow {
    /// When the message was deleted
    pub delete_date: Option<i64>,
    /// When the message was sent
    pub message_date: Option<i64>,
    /// When it was unsent
    pub date_retracted: Option<i64>,
    /// Globally unique identifier
    pub guid: Option<String>,
    /// Message body
    pub text: Option<String>,
    /// Transport service of the message
    pub service: Option<String>,
    /// Sent by the local account
    pub is_from_me: bool,
    /// Subject line
    pub subject: Option<String>,
    /// Group name set by this message
    pub group_title: Option<String>,
    /// Counterparty handle row id
    pub handle_id: Option<i64>,
    /// Local account identifier
    pub destination_caller_id: Option<String>,
    /// Message a reaction or tapback refers to
    pub associated_message_guid: Option<String>,
    /// Message this replies to
    pub reply_to_guid: Option<String>,
    /// Identifier of the owning chat
    pub chat_identifier: Option<String>,
    /// Service of the owning chat
    pub service_name: Option<String>,
}

impl HiddenMessageRow {
    /// Map a raw row, degrading malformed fields to `None`/`false`.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            delete_date: row.int(hidden::DELETE_DATE),
            message_date: row.int(hidden::MESSAGE_DATE),
            date_retracted: row.int(message::DATE_RETRACTED),
            guid: row.text(message::GUID),
            text: row.text(message::TEXT),
            service: row.text(message::SERVICE),
            is_from_me: row.flag(message::IS_FROM_ME),
            subject: row.text(message::SUBJECT),
            group_title: row.text(message::GROUP_TITLE),
            handle_id: row.int(message::HANDLE_ID),
            destination_caller_id: row.text(message::DESTINATION_CALLER_ID),
            associated_message_guid: row.text(message::ASSOCIATED_MESSAGE_GUID),
            reply_to_guid: row.text(message::REPLY_TO_GUID),
            chat_identifier: row.text(message::CHAT_IDENTIFIER),
            service_name: row.text(hidden::SERVICE_NAME),
        }
    }
}

/// A handle joined with its messages and chats, possibly pre-aggregated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRow {
    /// Internal row identifier
    pub row_id: Option<i64>,
    /// Handle identifier
    pub identifier: Option<String>,
    /// Service the handle is registered with
    pub service: Option<String>,
    /// Country code
    pub country: Option<String>,
    /// Identifier as originally entered
    pub uncanonicalized_id: Option<String>,
    /// Messages exchanged with the handle
    pub message_count: i64,
    /// Chats the handle is in
    pub chat_count: i64,
    /// Comma-joined chat identifiers
    pub shared_chats: Option<String>,
    /// Comma-joined chat styles
    pub chat_styles: Option<String>,
    /// Per-category message counts
    pub counters: CategoryCounters,
}

/// The eleven per-category message counters of a contact rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounters {
    /// Voice messages
    pub audio: i64,
    /// Messages carrying only attachments
    pub attachment: i64,
    /// Emoji-only messages
    pub emoji: i64,
    /// Messages downgraded to SMS
    pub downgraded: i64,
    /// Delayed messages
    pub delayed: i64,
    /// Automatic replies
    pub auto_reply: i64,
    /// Spam messages
    pub spam: i64,
    /// System messages
    pub system: i64,
    /// Forwarded messages
    pub forward: i64,
    /// Archived messages
    pub archive: i64,
    /// Expiring messages
    pub expirable: i64,
}

impl CategoryCounters {
    /// Field-wise sum
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            audio: self.audio + other.audio,
            attachment: self.attachment + other.attachment,
            emoji: self.emoji + other.emoji,
            downgraded: self.downgraded + other.downgraded,
            delayed: self.delayed + other.delayed,
            auto_reply: self.auto_reply + other.auto_reply,
            spam: self.spam + other.spam,
            system: self.system + other.system,
            forward: self.forward + other.forward,
            archive: self.archive + other.archive,
            expirable: self.expirable + other.expirable,
        }
    }
}

impl ContactRow {
    /// Map a raw row; missing counters read as zero.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Self {
        let count = |name: &str| row.int(name).unwrap_or(0);
        Self {
            row_id: row.int(handle::ROWID),
            identifier: row.text(handle::ID),
            service: row.text(handle::SERVICE),
            country: row.text(handle::COUNTRY),
            uncanonicalized_id: row.text(handle::UNCANONICALIZED_ID),
            message_count: count(contact::MESSAGE_COUNT),
            chat_count: count(contact::CHAT_COUNT),
            shared_chats: row.text(contact::SHARED_CHATS),
            chat_styles: row.text(contact::CHAT_STYLES),
            counters: CategoryCounters {
                audio: count(contact::AUDIO_COUNT),
                attachment: count(contact::ATTACHMENT_COUNT),
                emoji: count(contact::EMOJI_COUNT),
                downgraded: count(contact::DOWNGRADED_COUNT),
                delayed: count(contact::DELAYED_COUNT),
                auto_reply: count(contact::AUTO_REPLY_COUNT),
                spam: count(contact::SPAM_COUNT),
                system: count(contact::SYSTEM_COUNT),
                forward: count(contact::FORWARD_COUNT),
                archive: count(contact::ARCHIVE_COUNT),
                expirable: count(contact::EXPIRABLE_COUNT),
            },
        }
    }
}

/// A chat with its message count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadRow {
    /// Chat row id
    pub row_id: Option<i64>,
    /// Chat guid
    pub guid: Option<String>,
    /// Identifier of the owning chat
    pub chat_identifier: Option<String>,
    /// Name shown for the chat
    pub display_name: Option<String>,
    /// Service of the chat
    pub service_name: Option<String>,
    /// `43` for groups, `45` for one-to-one
    pub style: Option<i64>,
    /// Messages in the chat
    pub message_count: i64,
    /// Raw date of the newest message
    pub last_message_date: Option<i64>,
}

impl ThreadRow {
    /// Map a raw row, degrading malformed fields to `None`.
    #[must_use]
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            row_id: row.int(chat::ROWID),
            guid: row.text(chat::GUID),
            chat_identifier: row.text(chat::CHAT_IDENTIFIER),
            display_name: row.text(chat::DISPLAY_NAME),
            service_name: row.text(chat::SERVICE_NAME),
            style: row.int(chat::STYLE),
            message_count: row.int(chat::MESSAGE_COUNT).unwrap_or(0),
            last_message_date: row.int(chat::LAST_MESSAGE_DATE),
        }
    }
}

/// The record kinds an extraction run can produce, one per output section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Messages with text
    Messages,
    /// Attachments and their parent message direction
    Attachments,
    /// Per-handle rollups
    Contacts,
    /// Chat summaries
    Threads,
    /// Recently deleted, recoverable messages
    HiddenMessages,
    /// Unsent compositions on disk
    Drafts,
    /// Messages matching a search term
    Search,
}

impl RecordKind {
    /// Every kind selected by `--all` (search needs a term, so it is not included)
    pub const ALL: [Self; 6] = [
        Self::Messages,
        Self::Attachments,
        Self::Contacts,
        Self::Threads,
        Self::HiddenMessages,
        Self::Drafts,
    ];

    /// Section name used in the output envelope
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Attachments => "attachments",
            Self::Contacts => "contacts",
            Self::Threads => "threads",
            Self::HiddenMessages => "hidden_messages",
            Self::Drafts => "drafts",
            Self::Search => "search",
        }
    }

    /// True when the section is read from the chat store (and gated by the permission probe)
    #[must_use]
    pub const fn is_store_backed(self) -> bool {
        !matches!(self, Self::Drafts)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// Inclusive calendar date range for filtering messages, interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Inclusive raw `date` windows covering the range, one per timestamp
    /// encoding the store may use.
    #[must_use]
    pub fn raw_windows(&self) -> Vec<(i64, i64)> {
        raw_windows_for_unix_span(unix_at_start_of(self.start), unix_at_end_of(self.end))
    }
}

/// Filter applied to the message and search queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Substring matched against text, guid and participant identifiers
    pub search: Option<String>,
    /// Restrict by message date
    pub date_range: Option<DateRange>,
}

/// Output format for rendered results.
///
/// `Json` is the structured rendering; every other variant is a tabular
/// flattening that differs only in delimiter and quoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Nested JSON document (default)
    #[default]
    Json,
    /// Tab-delimited rows
    Line,
    /// Comma-separated values with quoting
    Csv,
    /// Space-aligned columns
    Column,
    /// HTML table rows
    Html,
    /// SQL insert statements
    Insert,
    /// Pipe-delimited rows
    List,
}

impl RenderFormat {
    /// Every accepted format name
    pub const NAMES: [&'static str; 7] = ["json", "line", "csv", "column", "html", "insert", "list"];

    /// True for the nested structured rendering
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Line | Self::Column | Self::List => "txt",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::Insert => "sql",
        }
    }

    /// Format name as accepted on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Line => "line",
            Self::Csv => "csv",
            Self::Column => "column",
            Self::Html => "html",
            Self::Insert => "insert",
            Self::List => "list",
        }
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = crate::error::MsgIntelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "line" => Ok(Self::Line),
            "csv" => Ok(Self::Csv),
            "column" => Ok(Self::Column),
            "html" => Ok(Self::Html),
            "insert" => Ok(Self::Insert),
            "list" => Ok(Self::List),
            other => Err(crate::error::MsgIntelError::InvalidInput(format!(
                "Invalid output format: {other}. Valid formats: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}
