//! Raw rows to canonical records.
//!
//! Every function here is pure: typed rows plus the handle directory in,
//! records out. Malformed fields were already degraded when the typed rows
//! were built, so assembly itself cannot fail.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::handles::HandleDirectory;
use crate::identity::{is_email, resolve_direction};
use crate::models::{AttachmentRow, ContactRow, HiddenMessageRow, MessageRow, ThreadRow};
use crate::records::{
    AttachmentMetadata, AttachmentRecord, AttachmentStatus, Channel, ContactInfo, ContactRecord, ContactRelationships,
    ContactStats, HiddenContext, HiddenMessageRecord, HiddenThread, HiddenTimeline, ICloudMetadata,
    MessageCommunication, MessageContent, MessageRecord, MessageState, MessageTimestamps, MessageType,
    ParentMessage, ParentMessageState, ThreadLinks, ThreadRecord,
};
use crate::timestamp::normalize_apple_timestamp;

/// Build a canonical message record.
#[must_use]
pub fn assemble_message(row: &MessageRow, directory: &HandleDirectory) -> MessageRecord {
    let direction = resolve_direction(row, directory);
    MessageRecord {
        guid: row.guid.clone(),
        timestamps: MessageTimestamps {
            date: normalize_apple_timestamp(row.date),
            date_read: normalize_apple_timestamp(row.date_read),
            date_delivered: normalize_apple_timestamp(row.date_delivered),
            date_played: normalize_apple_timestamp(row.date_played),
            date_retracted: normalize_apple_timestamp(row.date_retracted),
            date_edited: normalize_apple_timestamp(row.date_edited),
        },
        message_type: MessageType {
            is_empty: row.is_empty,
            is_archive: row.is_archive,
            is_spam: row.is_spam,
            is_corrupt: row.is_corrupt,
            is_expirable: row.is_expirable,
            is_system: row.is_system_message,
            is_service: row.is_service_message,
            is_forward: row.is_forward,
            is_audio: row.is_audio_message,
            is_emote: row.is_emote,
        },
        state: MessageState {
            is_delivered: row.is_delivered,
            is_read: row.is_read,
            is_sent: row.is_sent,
            is_played: row.is_played,
            is_prepared: row.is_prepared,
            is_finished: row.is_finished,
            is_empty: row.is_empty,
            was_data_detected: row.was_data_detected,
            was_delivered_quietly: row.was_delivered_quietly,
            was_detonated: row.was_detonated,
        },
        communication: MessageCommunication {
            channel: Channel {
                service: row.service.clone(),
                version: row.version,
                is_from_me: row.is_from_me,
                chat_identifier: row.chat_identifier.clone(),
                thread: ThreadLinks {
                    reply_to_guid: row.reply_to_guid.clone(),
                    originator_guid: row.thread_originator_guid.clone(),
                    associated_guid: row.associated_message_guid.clone(),
                },
            },
            sender: direction.sender,
            receiver: direction.receiver,
        },
        content: MessageContent {
            text: row.text.clone(),
            subject: row.subject.clone(),
            group_title: row.group_title.clone(),
        },
        icloud: ICloudMetadata {
            ck_sync_state: row.ck_sync_state,
            ck_record_id: row.ck_record_id.clone(),
            ck_record_change_tag: row.ck_record_change_tag.clone(),
        },
    }
}

/// Parent message guid embedded in an attachment guid: everything after the
/// second `_`. Attachment guids that do not follow that layout yield `None`.
#[must_use]
pub fn derive_message_guid(attachment_guid: &str) -> Option<String> {
    let mut parts = attachment_guid.splitn(3, '_');
    parts.next()?;
    parts.next()?;
    parts.next().map(String::from)
}

/// Build a canonical attachment record.
#[must_use]
pub fn assemble_attachment(row: &AttachmentRow, directory: &HandleDirectory) -> AttachmentRecord {
    AttachmentRecord {
        guid: row.guid.clone(),
        created_date: normalize_apple_timestamp(row.created_date),
        metadata: AttachmentMetadata {
            filename: row.filename.clone(),
            mime_type: row.mime_type.clone(),
            uti: row.uti.clone(),
            transfer_name: row.transfer_name.clone(),
            total_bytes: row.total_bytes,
        },
        status: AttachmentStatus {
            transfer_state: row.transfer_state,
            is_outgoing: row.is_outgoing,
            is_sticker: row.is_sticker,
            hide_attachment: row.hide_attachment,
            is_commsafety_sensitive: row.is_commsafety_sensitive,
            ck_sync_state: row.ck_sync_state,
            original_guid: row.original_guid.clone(),
            ck_record_id: row.ck_record_id.clone(),
        },
        message: ParentMessage {
            guid: row.guid.as_deref().and_then(derive_message_guid),
            is_from_me: row.is_from_me,
            communication: resolve_direction(row, directory),
            state: ParentMessageState {
                is_delivered: row.is_delivered,
                is_read: row.is_read,
                is_sent: row.is_sent,
                is_empty: row.is_empty,
                is_delayed: row.is_delayed,
                is_auto_reply: row.is_auto_reply,
                is_prepared: row.is_prepared,
                is_finished: row.is_finished,
                is_spam: row.is_spam,
                is_kt_verified: row.is_kt_verified,
            },
        },
    }
}

/// Build a canonical hidden-message record.
#[must_use]
pub fn assemble_hidden_message(row: &HiddenMessageRow, directory: &HandleDirectory) -> HiddenMessageRecord {
    HiddenMessageRecord {
        guid: row.guid.clone(),
        is_from_me: row.is_from_me,
        timeline: HiddenTimeline {
            delete_date: normalize_apple_timestamp(row.delete_date),
            date: normalize_apple_timestamp(row.message_date),
            date_retracted: normalize_apple_timestamp(row.date_retracted),
        },
        communication: resolve_direction(row, directory),
        content: MessageContent {
            text: row.text.clone(),
            subject: row.subject.clone(),
            group_title: row.group_title.clone(),
        },
        thread: HiddenThread {
            associated_guid: row.associated_message_guid.clone(),
            reply_to_guid: row.reply_to_guid.clone(),
        },
        context: HiddenContext {
            chat_identifier: row.chat_identifier.clone(),
            service: row.service.clone(),
            service_name: row.service_name.clone(),
        },
    }
}

/// Stable sort, most recently deleted first; records without a delete date go last.
///
/// Canonical timestamps sort lexicographically in time order.
pub fn order_by_delete_date_desc(records: &mut [HiddenMessageRecord]) {
    records.sort_by(|a, b| match (&a.timeline.delete_date, &b.timeline.delete_date) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Roll contact rows up by handle row id, in first-seen order.
///
/// Counters are summed; chat and style lists are split on `,` and de-duplicated
/// preserving order. Style codes that are not integers are dropped.
#[must_use]
pub fn assemble_contacts(rows: &[ContactRow]) -> Vec<ContactRecord> {
    let mut records: Vec<ContactRecord> = Vec::new();
    let mut index_by_handle: HashMap<Option<i64>, usize> = HashMap::new();

    for row in rows {
        let index = *index_by_handle.entry(row.row_id).or_insert_with(|| {
            records.push(new_contact(row));
            records.len() - 1
        });
        let record = &mut records[index];

        record.stats.message_count += row.message_count;
        record.stats.chat_count += row.chat_count;
        record.stats.types = record.stats.types.add(row.counters);

        for chat in split_list(row.shared_chats.as_deref()) {
            push_unique(&mut record.relationships.shared_chats, chat.to_string());
        }
        for style in split_list(row.chat_styles.as_deref()).filter_map(|code| code.parse::<i64>().ok()) {
            push_unique(&mut record.relationships.chat_styles, style);
        }
    }

    records
}

fn new_contact(row: &ContactRow) -> ContactRecord {
    let identifier = row.identifier.as_deref();
    let email = is_email(identifier);
    ContactRecord {
        contact_info: ContactInfo {
            handle_row_id: row.row_id,
            id: row.identifier.clone(),
            phone_number: identifier.filter(|_| !email).map(String::from),
            email: identifier.filter(|_| email).map(String::from),
            country: row.country.clone(),
            service: row.service.clone(),
            uncanonicalized_id: row.uncanonicalized_id.clone(),
        },
        stats: ContactStats::default(),
        relationships: ContactRelationships::default(),
    }
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.into_iter().flat_map(|list| list.split(',')).map(str::trim).filter(|item| !item.is_empty())
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Build a thread summary record.
#[must_use]
pub fn assemble_thread(row: &ThreadRow) -> ThreadRecord {
    ThreadRecord {
        row_id: row.row_id,
        guid: row.guid.clone(),
        chat_identifier: row.chat_identifier.clone(),
        display_name: row.display_name.clone(),
        service_name: row.service_name.clone(),
        style: row.style,
        message_count: row.message_count,
        last_message_date: normalize_apple_timestamp(row.last_message_date),
    }
}
