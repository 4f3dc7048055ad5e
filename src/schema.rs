//! Chat store schema definitions
//!
//! Column names as they appear in the raw rows returned by the bulk queries below,
//! and the query text itself. Every query aliases its columns so the row shape is
//! stable across macOS versions.

/// Handle table columns
pub mod handle {
    /// Row identifier
    pub const ROWID: &str = "rowid";
    /// External identifier (phone number or email address)
    pub const ID: &str = "id";
    /// Country code
    pub const COUNTRY: &str = "country";
    /// Service the handle was registered on
    pub const SERVICE: &str = "service";
    /// Identifier as originally entered
    pub const UNCANONICALIZED_ID: &str = "uncanonicalized_id";
}

/// Message columns (shared by the message, search, attachment and hidden queries)
pub mod message {
    /// Row identifier
    pub const ROWID: &str = "rowid";
    /// Globally unique message identifier
    pub const GUID: &str = "guid";
    /// Message body
    pub const TEXT: &str = "text";
    /// Service (iMessage, SMS, ...)
    pub const SERVICE: &str = "service";
    /// Counterparty handle row id
    pub const HANDLE_ID: &str = "handle_id";
    /// Non-zero when the local user authored the message
    pub const IS_FROM_ME: &str = "is_from_me";
    /// Caller identifier of the local account the message went through
    pub const DESTINATION_CALLER_ID: &str = "destination_caller_id";
    /// Message format version
    pub const VERSION: &str = "version";
    /// Sent/received time
    pub const DATE: &str = "date";
    /// Read time
    pub const DATE_READ: &str = "date_read";
    /// Delivery time
    pub const DATE_DELIVERED: &str = "date_delivered";
    /// Audio playback time
    pub const DATE_PLAYED: &str = "date_played";
    /// Unsend time
    pub const DATE_RETRACTED: &str = "date_retracted";
    /// Last edit time
    pub const DATE_EDITED: &str = "date_edited";
    /// Subject line
    pub const SUBJECT: &str = "subject";
    /// Group name at the time of the message
    pub const GROUP_TITLE: &str = "group_title";
    /// Message this one reacts to
    pub const ASSOCIATED_MESSAGE_GUID: &str = "associated_message_guid";
    /// Message this one replies to
    pub const REPLY_TO_GUID: &str = "reply_to_guid";
    /// First message of the thread
    pub const THREAD_ORIGINATOR_GUID: &str = "thread_originator_guid";
    /// Chat the message belongs to
    pub const CHAT_IDENTIFIER: &str = "chat_identifier";

    /// Column `is_delivered`
    pub const IS_DELIVERED: &str = "is_delivered";
    /// Column `is_read`
    pub const IS_READ: &str = "is_read";
    /// Column `is_sent`
    pub const IS_SENT: &str = "is_sent";
    /// Column `is_played`
    pub const IS_PLAYED: &str = "is_played";
    /// Column `is_prepared`
    pub const IS_PREPARED: &str = "is_prepared";
    /// Column `is_finished`
    pub const IS_FINISHED: &str = "is_finished";
    /// Column `is_empty`
    pub const IS_EMPTY: &str = "is_empty";
    /// Column `is_archive`
    pub const IS_ARCHIVE: &str = "is_archive";
    /// Column `is_spam`
    pub const IS_SPAM: &str = "is_spam";
    /// Column `is_corrupt`
    pub const IS_CORRUPT: &str = "is_corrupt";
    /// Column `is_expirable`
    pub const IS_EXPIRABLE: &str = "is_expirable";
    /// Column `is_system_message`
    pub const IS_SYSTEM_MESSAGE: &str = "is_system_message";
    /// Column `is_service_message`
    pub const IS_SERVICE_MESSAGE: &str = "is_service_message";
    /// Column `is_forward`
    pub const IS_FORWARD: &str = "is_forward";
    /// Column `is_audio_message`
    pub const IS_AUDIO_MESSAGE: &str = "is_audio_message";
    /// Column `is_emote`
    pub const IS_EMOTE: &str = "is_emote";
    /// Column `is_delayed`
    pub const IS_DELAYED: &str = "is_delayed";
    /// Column `is_auto_reply`
    pub const IS_AUTO_REPLY: &str = "is_auto_reply";
    /// Column `is_kt_verified`
    pub const IS_KT_VERIFIED: &str = "is_kt_verified";
    /// Column `was_data_detected`
    pub const WAS_DATA_DETECTED: &str = "was_data_detected";
    /// Column `was_delivered_quietly`
    pub const WAS_DELIVERED_QUIETLY: &str = "was_delivered_quietly";
    /// Column `was_detonated`
    pub const WAS_DETONATED: &str = "was_detonated";

    /// iCloud sync state
    pub const CK_SYNC_STATE: &str = "ck_sync_state";
    /// iCloud record id
    pub const CK_RECORD_ID: &str = "ck_record_id";
    /// iCloud record change tag
    pub const CK_RECORD_CHANGE_TAG: &str = "ck_record_change_tag";
}

/// Attachment columns
pub mod attachment {
    /// Column `rowid`
    pub const ROWID: &str = "rowid";
    /// Column `guid`
    pub const GUID: &str = "guid";
    /// Column `created_date`
    pub const CREATED_DATE: &str = "created_date";
    /// Column `filename`
    pub const FILENAME: &str = "filename";
    /// Column `mime_type`
    pub const MIME_TYPE: &str = "mime_type";
    /// Column `uti`
    pub const UTI: &str = "uti";
    /// Column `transfer_name`
    pub const TRANSFER_NAME: &str = "transfer_name";
    /// Column `total_bytes`
    pub const TOTAL_BYTES: &str = "total_bytes";
    /// Column `transfer_state`
    pub const TRANSFER_STATE: &str = "transfer_state";
    /// Column `is_outgoing`
    pub const IS_OUTGOING: &str = "is_outgoing";
    /// Column `is_sticker`
    pub const IS_STICKER: &str = "is_sticker";
    /// Column `hide_attachment`
    pub const HIDE_ATTACHMENT: &str = "hide_attachment";
    /// Column `is_commsafety_sensitive`
    pub const IS_COMMSAFETY_SENSITIVE: &str = "is_commsafety_sensitive";
    /// Column `ck_sync_state`
    pub const CK_SYNC_STATE: &str = "ck_sync_state";
    /// Column `original_guid`
    pub const ORIGINAL_GUID: &str = "original_guid";
    /// Column `ck_record_id`
    pub const CK_RECORD_ID: &str = "ck_record_id";
}

/// Recoverable (recently deleted) message columns
pub mod hidden {
    /// When the message was moved to Recently Deleted
    pub const DELETE_DATE: &str = "delete_date";
    /// Original message time, aliased to avoid clashing with `delete_date`
    pub const MESSAGE_DATE: &str = "message_date";
    /// Chat service name
    pub const SERVICE_NAME: &str = "service_name";
}

/// Per-handle aggregate columns
pub mod contact {
    /// Column `message_count`
    pub const MESSAGE_COUNT: &str = "message_count";
    /// Column `chat_count`
    pub const CHAT_COUNT: &str = "chat_count";
    /// Comma-joined chat identifiers
    pub const SHARED_CHATS: &str = "shared_chats";
    /// Comma-joined numeric chat styles
    pub const CHAT_STYLES: &str = "chat_styles";
    /// Column `audio_count`
    pub const AUDIO_COUNT: &str = "audio_count";
    /// Column `attachment_count`
    pub const ATTACHMENT_COUNT: &str = "attachment_count";
    /// Column `emoji_count`
    pub const EMOJI_COUNT: &str = "emoji_count";
    /// Column `downgraded_count`
    pub const DOWNGRADED_COUNT: &str = "downgraded_count";
    /// Column `delayed_count`
    pub const DELAYED_COUNT: &str = "delayed_count";
    /// Column `auto_reply_count`
    pub const AUTO_REPLY_COUNT: &str = "auto_reply_count";
    /// Column `spam_count`
    pub const SPAM_COUNT: &str = "spam_count";
    /// Column `system_count`
    pub const SYSTEM_COUNT: &str = "system_count";
    /// Column `forward_count`
    pub const FORWARD_COUNT: &str = "forward_count";
    /// Column `archive_count`
    pub const ARCHIVE_COUNT: &str = "archive_count";
    /// Column `expirable_count`
    pub const EXPIRABLE_COUNT: &str = "expirable_count";
}

/// Chat thread columns
pub mod chat {
    /// Column `rowid`
    pub const ROWID: &str = "rowid";
    /// Column `guid`
    pub const GUID: &str = "guid";
    /// Column `chat_identifier`
    pub const CHAT_IDENTIFIER: &str = "chat_identifier";
    /// Column `display_name`
    pub const DISPLAY_NAME: &str = "display_name";
    /// Column `service_name`
    pub const SERVICE_NAME: &str = "service_name";
    /// Column `style`
    pub const STYLE: &str = "style";
    /// Column `message_count`
    pub const MESSAGE_COUNT: &str = "message_count";
    /// Column `last_message_date`
    pub const LAST_MESSAGE_DATE: &str = "last_message_date";
}

/// Bulk query text
pub mod queries {
    /// Every handle, for the per-session directory
    pub const HANDLES: &str = "SELECT ROWID AS rowid, id, country FROM handle";

    /// Message columns and joins shared by the message and search queries.
    /// Callers append a `WHERE` clause and ordering.
    pub const MESSAGE_SELECT: &str = "SELECT
            m.ROWID AS rowid, m.guid, m.text, m.service, m.handle_id,
            m.is_from_me, m.destination_caller_id, m.version,
            m.date, m.date_read, m.date_delivered, m.date_played, m.date_retracted, m.date_edited,
            m.subject, m.group_title,
            m.associated_message_guid, m.reply_to_guid, m.thread_originator_guid,
            m.is_delivered, m.is_read, m.is_sent, m.is_played, m.is_prepared, m.is_finished,
            m.is_empty, m.is_archive, m.is_spam, m.is_corrupt, m.is_expirable,
            m.is_system_message, m.is_service_message, m.is_forward, m.is_audio_message, m.is_emote,
            m.was_data_detected, m.was_delivered_quietly, m.was_detonated,
            m.ck_sync_state, m.ck_record_id, m.ck_record_change_tag,
            c.chat_identifier
        FROM message m
        LEFT JOIN chat_message_join cmj ON m.ROWID = cmj.message_id
        LEFT JOIN chat c ON cmj.chat_id = c.ROWID
        LEFT JOIN handle h ON m.handle_id = h.ROWID";

    /// Ordering for message and search results
    pub const MESSAGE_ORDER: &str = " ORDER BY m.date ASC, m.ROWID ASC";

    /// Attachments joined to their parent message
    pub const ATTACHMENTS: &str = "SELECT
            a.ROWID AS rowid, a.guid, a.created_date,
            a.filename, a.mime_type, a.uti, a.transfer_name, a.total_bytes,
            a.transfer_state, a.is_outgoing, a.is_sticker, a.hide_attachment,
            a.is_commsafety_sensitive, a.ck_sync_state, a.original_guid, a.ck_record_id,
            m.handle_id, m.is_from_me, m.destination_caller_id,
            m.is_delivered, m.is_read, m.is_sent, m.is_empty, m.is_delayed, m.is_auto_reply,
            m.is_prepared, m.is_finished, m.is_spam, m.is_kt_verified
        FROM attachment a
        LEFT JOIN message_attachment_join maj ON a.ROWID = maj.attachment_id
        LEFT JOIN message m ON maj.message_id = m.ROWID
        ORDER BY a.ROWID ASC";

    /// Recoverable messages, most recently deleted first
    pub const HIDDEN_MESSAGES: &str = "SELECT
            crm.delete_date,
            m.date AS message_date,
            m.date_retracted,
            m.guid, m.text, m.service, m.is_from_me, m.subject, m.group_title,
            m.handle_id, m.destination_caller_id,
            m.associated_message_guid, m.reply_to_guid,
            c.chat_identifier, c.service_name
        FROM chat_recoverable_message_join crm
        JOIN chat c ON crm.chat_id = c.ROWID
        JOIN message m ON crm.message_id = m.ROWID
        LEFT JOIN handle h ON m.handle_id = h.ROWID
        WHERE m.text IS NOT NULL
        ORDER BY crm.delete_date DESC";

    /// Per-handle rollup. `attachment_count` counts non-empty rows without text.
    pub const CONTACTS: &str = "SELECT
            h.ROWID AS rowid,
            h.id,
            h.service,
            h.country,
            h.uncanonicalized_id,
            COUNT(m.ROWID) AS message_count,
            COUNT(DISTINCT c.ROWID) AS chat_count,
            GROUP_CONCAT(DISTINCT c.chat_identifier) AS shared_chats,
            GROUP_CONCAT(DISTINCT c.style) AS chat_styles,
            SUM(CASE WHEN m.is_audio_message = 1 THEN 1 ELSE 0 END) AS audio_count,
            SUM(CASE WHEN m.is_empty = 0 AND m.text IS NULL THEN 1 ELSE 0 END) AS attachment_count,
            SUM(CASE WHEN m.is_emote = 1 THEN 1 ELSE 0 END) AS emoji_count,
            SUM(CASE WHEN m.was_downgraded = 1 THEN 1 ELSE 0 END) AS downgraded_count,
            SUM(CASE WHEN m.is_delayed = 1 THEN 1 ELSE 0 END) AS delayed_count,
            SUM(CASE WHEN m.is_auto_reply = 1 THEN 1 ELSE 0 END) AS auto_reply_count,
            SUM(CASE WHEN m.is_spam = 1 THEN 1 ELSE 0 END) AS spam_count,
            SUM(CASE WHEN m.is_system_message = 1 THEN 1 ELSE 0 END) AS system_count,
            SUM(CASE WHEN m.is_forward = 1 THEN 1 ELSE 0 END) AS forward_count,
            SUM(CASE WHEN m.is_archive = 1 THEN 1 ELSE 0 END) AS archive_count,
            SUM(CASE WHEN m.is_expirable = 1 THEN 1 ELSE 0 END) AS expirable_count
        FROM handle h
        LEFT JOIN message m ON h.ROWID = m.handle_id
        LEFT JOIN chat_handle_join chj ON h.ROWID = chj.handle_id
        LEFT JOIN chat c ON chj.chat_id = c.ROWID
        GROUP BY h.ROWID
        ORDER BY h.id";

    /// One row per chat with its message count and latest message time
    pub const THREADS: &str = "SELECT
            c.ROWID AS rowid, c.guid, c.chat_identifier, c.display_name, c.service_name, c.style,
            COUNT(cm.message_id) AS message_count,
            MAX(m.date) AS last_message_date
        FROM chat c
        LEFT JOIN chat_message_join cm ON c.ROWID = cm.chat_id
        LEFT JOIN message m ON cm.message_id = m.ROWID
        GROUP BY c.ROWID
        ORDER BY c.ROWID ASC";
}
