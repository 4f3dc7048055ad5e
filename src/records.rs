//! Canonical, analysis-ready record shapes and the run envelope.
//!
//! These are pure data: everything here is produced by [`crate::assembler`] and
//! consumed by [`crate::render`]. Field names are part of the output format.

use serde::{Deserialize, Serialize};

use crate::identity::{Direction, Participant};
use crate::models::{CategoryCounters, RecordKind};

/// Normalized message timestamps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTimestamps {
    /// When the message was sent
    pub date: Option<String>,
    /// When it was read
    pub date_read: Option<String>,
    /// When it was delivered
    pub date_delivered: Option<String>,
    /// When audio or video was played
    pub date_played: Option<String>,
    /// When it was unsent
    pub date_retracted: Option<String>,
    /// When it was last edited
    pub date_edited: Option<String>,
}

/// What kind of message this is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct MessageType {
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
    pub is_system: bool,
    /// Service notice
    pub is_service: bool,
    /// Forwarded
    pub is_forward: bool,
    /// Voice message
    pub is_audio: bool,
    /// Emote
    pub is_emote: bool,
}

/// Delivery lifecycle of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct MessageState {
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
    /// Data detectors ran on the text
    pub was_data_detected: bool,
    /// Delivered without notification
    pub was_delivered_quietly: bool,
    /// Expired and removed
    pub was_detonated: bool,
}

/// Reply and reaction links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLinks {
    /// Message this replies to
    pub reply_to_guid: Option<String>,
    /// First message of the inline reply thread
    pub originator_guid: Option<String>,
    /// Message a reaction or tapback refers to
    pub associated_guid: Option<String>,
}

/// Service, chat and reply links of a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Transport service (`iMessage`, `SMS`)
    pub service: Option<String>,
    /// Message format version
    pub version: Option<i64>,
    /// Sent by the local account
    pub is_from_me: bool,
    /// Identifier of the owning chat
    pub chat_identifier: Option<String>,
    /// Reply links
    pub thread: ThreadLinks,
}

/// Channel plus both participants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCommunication {
    /// Service and chat
    pub channel: Channel,
    /// Author of the communication
    pub sender: Participant,
    /// Recipient of the communication
    pub receiver: Participant,
}

/// Text fields of a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Message body
    pub text: Option<String>,
    /// Subject line
    pub subject: Option<String>,
    /// Group name set by this message
    pub group_title: Option<String>,
}

/// iCloud sync metadata, passed through verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ICloudMetadata {
    /// iCloud sync state
    pub ck_sync_state: Option<i64>,
    /// iCloud record id
    pub ck_record_id: Option<String>,
    /// iCloud record change tag
    pub ck_record_change_tag: Option<String>,
}

/// A normalized message. Also used for search hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Globally unique identifier
    pub guid: Option<String>,
    /// Normalized timestamps
    pub timestamps: MessageTimestamps,
    /// Kind flags
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Delivery state
    pub state: MessageState,
    /// Who sent it to whom
    pub communication: MessageCommunication,
    /// Text content
    pub content: MessageContent,
    /// iCloud sync metadata
    pub icloud: ICloudMetadata,
}

/// File metadata of an attachment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMetadata {
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
}

/// Transfer and sync state of an attachment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AttachmentStatus {
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
}

/// State of the message an attachment belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParentMessageState {
    /// Delivered
    pub is_delivered: bool,
    /// Read by the recipient
    pub is_read: bool,
    /// Sent
    pub is_sent: bool,
    /// Has no content
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

/// The message an attachment belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMessage {
    /// Derived from the attachment guid; see [`crate::assembler::derive_message_guid`]
    pub guid: Option<String>,
    /// Parent sent by the local account
    pub is_from_me: bool,
    /// Who sent the parent to whom
    pub communication: Direction,
    /// Delivery state of the parent
    pub state: ParentMessageState,
}

/// A normalized attachment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// Attachment guid
    pub guid: Option<String>,
    /// When the attachment was created
    pub created_date: Option<String>,
    /// File metadata
    pub metadata: AttachmentMetadata,
    /// Transfer status
    pub status: AttachmentStatus,
    /// The message carrying the attachment
    pub message: ParentMessage,
}

/// Deletion and send times of a recoverable message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenTimeline {
    /// When the message was deleted
    pub delete_date: Option<String>,
    /// When the message was sent
    pub date: Option<String>,
    /// When it was unsent
    pub date_retracted: Option<String>,
}

/// Reply and reaction links of a recoverable message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenThread {
    /// Message a reaction or tapback refers to
    pub associated_guid: Option<String>,
    /// Message this replies to
    pub reply_to_guid: Option<String>,
}

/// Chat and service of a recoverable message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenContext {
    /// Identifier of the owning chat
    pub chat_identifier: Option<String>,
    /// Transport service of the message
    pub service: Option<String>,
    /// Service of the owning chat
    pub service_name: Option<String>,
}

/// A recently deleted message that can still be recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenMessageRecord {
    /// Globally unique identifier
    pub guid: Option<String>,
    /// Sent by the local account
    pub is_from_me: bool,
    /// Deletion and send times
    pub timeline: HiddenTimeline,
    /// Who sent it to whom
    pub communication: Direction,
    /// Text content
    pub content: MessageContent,
    /// Reply and reaction links
    pub thread: HiddenThread,
    /// Chat and service
    pub context: HiddenContext,
}

/// Identity of a contact handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Handle row id
    pub handle_row_id: Option<i64>,
    /// Handle identifier as stored
    pub id: Option<String>,
    /// Phone number, when the identifier is not an email
    pub phone_number: Option<String>,
    /// Email, when the identifier contains `@`
    pub email: Option<String>,
    /// Country code
    pub country: Option<String>,
    /// Service the handle is registered with
    pub service: Option<String>,
    /// Identifier as originally entered
    pub uncanonicalized_id: Option<String>,
}

/// Message counts of a contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactStats {
    /// Number of messages
    pub message_count: i64,
    /// Number of chats
    pub chat_count: i64,
    /// Per-category message counts
    pub types: CategoryCounters,
}

/// Chats shared with a contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRelationships {
    /// Chat identifiers shared with this handle
    pub shared_chats: Vec<String>,
    /// Styles of those chats
    pub chat_styles: Vec<i64>,
}

/// Per-handle rollup of message counts and shared chats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Identity of the handle
    pub contact_info: ContactInfo,
    /// Message counts
    pub stats: ContactStats,
    /// Shared chats
    pub relationships: ContactRelationships,
}

/// Chat summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
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
    /// Date of the newest message
    pub last_message_date: Option<String>,
}

/// Where a draft was read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSource {
    /// Always `"plist"`
    #[serde(rename = "type")]
    pub source_type: String,
    /// Account directory name
    pub directory: String,
    /// Path of the composition file
    pub path: String,
}

/// Intended recipient of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReceiver {
    /// Recipient account (phone or email, or `Pending`)
    pub account: String,
    /// `iMessage` when the account contains `@`, else `SMS`
    pub service: String,
}

/// Recipient side of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCommunication {
    /// Intended recipient
    pub receiver: DraftReceiver,
}

/// The archived composition payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftData {
    /// Recovered draft text
    pub text: String,
    /// Always `NSKeyedArchiver`
    pub format: String,
    /// Always `base64`
    pub encoding_method: String,
    /// Always `application/x-plist`
    pub mime_type: String,
    /// Archive size in bytes
    pub data_length: usize,
    /// Base64 of the archive
    pub encoded_data: String,
}

/// Text and attachments of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftContent {
    /// The archived composition
    pub data: DraftData,
    /// `file://` URLs of attached files
    pub attachments: Vec<String>,
}

/// Delivery flags. Only `is_pending` can be set; a draft was never sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DraftDelivery {
    /// Recipient not chosen yet
    pub is_pending: bool,
    /// Delivered
    pub is_delivered: bool,
    /// Sent
    pub is_sent: bool,
    /// Read by the recipient
    pub is_read: bool,
    /// Media played
    pub is_played: bool,
    /// Prepared for sending
    pub is_prepared: bool,
    /// Finished processing
    pub is_finished: bool,
    /// Delivered without notification
    pub was_delivered_quietly: bool,
    /// Recipient was notified
    pub did_notify_recipient: bool,
    /// Downgraded to SMS
    pub was_downgraded: bool,
    /// Expired and removed
    pub was_detonated: bool,
    /// Delivery delayed
    pub is_delayed: bool,
}

/// Attachment flag and file times of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// An `Attachments` directory sits beside the composition
    pub has_attachments: bool,
    /// When the composition was created
    pub created: Option<String>,
    /// When it was last modified
    pub last_modified: Option<String>,
}

/// Delivery flags and file state of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStatus {
    /// Delivery flags
    pub delivery: DraftDelivery,
    /// Delivery state
    pub state: DraftState,
}

/// An unsent composition recovered from disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    /// `DRAFT-<uuid>`, fresh every run
    pub draft_id: String,
    /// Run identifier
    pub job_id: String,
    /// Where the draft was read from
    pub source: DraftSource,
    /// Intended recipient
    pub communication: DraftCommunication,
    /// Text, archive and attachments
    pub content: DraftContent,
    /// Delivery flags and file times
    pub status: DraftStatus,
}

/// Describes what was asked for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInfo {
    /// When the run started
    pub timestamp: String,
    /// Path of the chat store
    pub source_db: String,
    /// Requested sections
    pub query_type: Vec<RecordKind>,
    /// Search term, if any
    pub search_term: Option<String>,
    /// `[start, end]` as `YYYY-MM-DD`
    pub date_range: Option<[String; 2]>,
}

/// Run metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// `JOB-<uuid>`
    pub job_id: String,
    /// Local user name
    pub user: String,
    /// Process id
    pub pid: u32,
    /// What was asked for
    pub query: QueryInfo,
}

/// Result sections. A section is present iff it was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSections {
    /// Messages with text
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub messages: Option<Vec<MessageRecord>>,
    /// `file://` URLs of attached files
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attachments: Option<Vec<AttachmentRecord>>,
    /// Per-handle rollups
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contacts: Option<Vec<ContactRecord>>,
    /// Chat summaries
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub threads: Option<Vec<ThreadRecord>>,
    /// Recoverable deleted messages
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hidden_messages: Option<Vec<HiddenMessageRecord>>,
    /// Unsent compositions
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub drafts: Option<Vec<DraftRecord>>,
    /// Search hits
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub search: Option<Vec<MessageRecord>>,
}

impl DataSections {
    /// Number of records in a section, `None` when the section is absent
    #[must_use]
    pub fn count(&self, kind: RecordKind) -> Option<usize> {
        match kind {
            RecordKind::Messages => self.messages.as_ref().map(Vec::len),
            RecordKind::Attachments => self.attachments.as_ref().map(Vec::len),
            RecordKind::Contacts => self.contacts.as_ref().map(Vec::len),
            RecordKind::Threads => self.threads.as_ref().map(Vec::len),
            RecordKind::HiddenMessages => self.hidden_messages.as_ref().map(Vec::len),
            RecordKind::Drafts => self.drafts.as_ref().map(Vec::len),
            RecordKind::Search => self.search.as_ref().map(Vec::len),
        }
    }
}

/// Top-level output document of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEnvelope {
    /// Run metadata
    pub job: JobInfo,
    /// Requested sections
    pub data: DataSections,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_sections_are_omitted() {
        let envelope = RunEnvelope {
            data: DataSections { messages: Some(Vec::new()), ..DataSections::default() },
            ..RunEnvelope::default()
        };
        let json = serde_json::to_value(&envelope).unwrap_or_default();
        let data = json.get("data").and_then(|d| d.as_object()).cloned().unwrap_or_default();
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("messages"));
    }

    #[test]
    fn test_message_type_serializes_as_type() {
        let json = serde_json::to_value(MessageRecord::default()).unwrap_or_default();
        assert!(json.get("type").is_some());
        assert!(json.get("message_type").is_none());
    }

    #[test]
    fn test_query_kinds_use_section_names() {
        let info = QueryInfo { query_type: vec![RecordKind::HiddenMessages], ..QueryInfo::default() };
        let json = serde_json::to_string(&info).unwrap_or_default();
        assert!(json.contains("\"hidden_messages\""));
    }

    #[test]
    fn test_section_counts() {
        let sections = DataSections { threads: Some(vec![ThreadRecord::default()]), ..DataSections::default() };
        assert_eq!(sections.count(RecordKind::Threads), Some(1));
        assert_eq!(sections.count(RecordKind::Drafts), None);
    }
}
