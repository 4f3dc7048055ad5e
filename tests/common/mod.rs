//! Shared fixtures: a small on-disk `chat.db` with the tables the bulk queries touch.

#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE handle (
        ROWID INTEGER PRIMARY KEY, id TEXT, country TEXT, service TEXT, uncanonicalized_id TEXT
    );
    CREATE TABLE message (
        ROWID INTEGER PRIMARY KEY, guid TEXT, text TEXT, service TEXT,
        handle_id INTEGER DEFAULT 0, is_from_me INTEGER DEFAULT 0, destination_caller_id TEXT,
        version INTEGER DEFAULT 10,
        date INTEGER, date_read INTEGER, date_delivered INTEGER, date_played INTEGER,
        date_retracted INTEGER, date_edited INTEGER,
        subject TEXT, group_title TEXT,
        associated_message_guid TEXT, reply_to_guid TEXT, thread_originator_guid TEXT,
        is_delivered INTEGER DEFAULT 0, is_read INTEGER DEFAULT 0, is_sent INTEGER DEFAULT 0,
        is_played INTEGER DEFAULT 0, is_prepared INTEGER DEFAULT 0, is_finished INTEGER DEFAULT 1,
        is_empty INTEGER DEFAULT 0, is_archive INTEGER DEFAULT 0, is_spam INTEGER DEFAULT 0,
        is_corrupt INTEGER DEFAULT 0, is_expirable INTEGER DEFAULT 0,
        is_system_message INTEGER DEFAULT 0, is_service_message INTEGER DEFAULT 0,
        is_forward INTEGER DEFAULT 0, is_audio_message INTEGER DEFAULT 0, is_emote INTEGER DEFAULT 0,
        is_delayed INTEGER DEFAULT 0, is_auto_reply INTEGER DEFAULT 0, is_kt_verified INTEGER DEFAULT 0,
        was_downgraded INTEGER DEFAULT 0, was_data_detected INTEGER DEFAULT 0,
        was_delivered_quietly INTEGER DEFAULT 0, was_detonated INTEGER DEFAULT 0,
        ck_sync_state INTEGER DEFAULT 0, ck_record_id TEXT, ck_record_change_tag TEXT
    );
    CREATE TABLE chat (
        ROWID INTEGER PRIMARY KEY, guid TEXT, chat_identifier TEXT, display_name TEXT,
        service_name TEXT, style INTEGER
    );
    CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER);
    CREATE TABLE chat_handle_join (chat_id INTEGER, handle_id INTEGER);
    CREATE TABLE attachment (
        ROWID INTEGER PRIMARY KEY, guid TEXT, created_date INTEGER, filename TEXT, mime_type TEXT,
        uti TEXT, transfer_name TEXT, total_bytes INTEGER, transfer_state INTEGER,
        is_outgoing INTEGER DEFAULT 0, is_sticker INTEGER DEFAULT 0, hide_attachment INTEGER DEFAULT 0,
        is_commsafety_sensitive INTEGER DEFAULT 0, ck_sync_state INTEGER DEFAULT 0,
        original_guid TEXT, ck_record_id TEXT
    );
    CREATE TABLE message_attachment_join (message_id INTEGER, attachment_id INTEGER);
    CREATE TABLE chat_recoverable_message_join (chat_id INTEGER, message_id INTEGER, delete_date INTEGER);
";

pub const ME: &str = "me@icloud.com";
pub const PHONE: &str = "+15551234567";
pub const FRIEND: &str = "friend@example.com";

/// Seconds between the Unix epoch and 2001-01-01
const APPLE_EPOCH: i64 = 978_307_200;

/// Unix seconds at `hour`:00 UTC on the given day
pub fn unix_at(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, 0, 0).unwrap().and_utc().timestamp()
}

/// Legacy store encoding (whole seconds since 2001) of `hour`:00 UTC on the given day
pub fn apple_seconds(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    unix_at(year, month, day, hour) - APPLE_EPOCH
}

/// Store encoding (nanoseconds since 2001) of `hour`:00 UTC on the given day
pub fn apple_nanos(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    (unix_at(year, month, day, hour) - APPLE_EPOCH) * 1_000_000_000
}

/// A populated store in a temporary directory.
///
/// | row | guid  | text                  | handle | from me | chat | date             |
/// |-----|-------|-----------------------|--------|---------|------|------------------|
/// | 1   | MSG-1 | Lunch at noon?        | 1      | no      | 1    | 2023-01-15 12:00 |
/// | 2   | MSG-2 | Sure, 50% off deal    | 1      | yes     | 1    | 2023-01-16 09:00 |
/// | 3   | MSG-3 | (none, attachment)    | 2      | no      | 2    | 2023-02-01 08:00 |
/// | 4   | MSG-4 | deleted lunch plans   | 2      | no      | -    | 2023-03-01 10:00 |
/// | 5   | MSG-5 | deleted earlier       | 1      | no      | -    | 2022-12-01 10:00 |
///
/// Rows 4 and 5 are recoverable; row 4 was deleted last.
pub struct ChatDbFixture {
    dir: TempDir,
    path: PathBuf,
}

impl ChatDbFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        seed(&conn);
        Self { dir, path }
    }

    /// A store with the schema but no rows
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a message from handle 1 with a raw `date` in whatever encoding the caller picks
    pub fn insert_message(&self, row_id: i64, guid: &str, text: &str, raw_date: i64) {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute(
            "INSERT INTO message (ROWID, guid, text, service, handle_id, is_from_me, destination_caller_id, date)
             VALUES (?1, ?2, ?3, 'SMS', 1, 0, ?4, ?5)",
            params![row_id, guid, text, ME, raw_date],
        )
        .unwrap();
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

fn seed(conn: &Connection) {
    conn.execute_batch(&format!(
        "INSERT INTO handle (ROWID, id, country, service, uncanonicalized_id) VALUES
            (1, '{PHONE}', 'us', 'iMessage', '5551234567'),
            (2, '{FRIEND}', 'us', 'iMessage', NULL);
         INSERT INTO chat (ROWID, guid, chat_identifier, display_name, service_name, style) VALUES
            (1, 'iMessage;-;{PHONE}', '{PHONE}', NULL, 'iMessage', 45),
            (2, 'iMessage;+;chat42', 'chat42', 'Weekend plans', 'iMessage', 43);
         INSERT INTO chat_handle_join (chat_id, handle_id) VALUES (1, 1), (2, 1), (2, 2);
         INSERT INTO chat_message_join (chat_id, message_id) VALUES (1, 1), (1, 2), (2, 3);"
    ))
    .unwrap();

    let messages: [(i64, &str, Option<&str>, i64, i64, i64); 5] = [
        (1, "MSG-1", Some("Lunch at noon?"), 1, 0, apple_nanos(2023, 1, 15, 12)),
        (2, "MSG-2", Some("Sure, 50% off deal"), 1, 1, apple_nanos(2023, 1, 16, 9)),
        (3, "MSG-3", None, 2, 0, apple_nanos(2023, 2, 1, 8)),
        (4, "MSG-4", Some("deleted lunch plans"), 2, 0, apple_nanos(2023, 3, 1, 10)),
        (5, "MSG-5", Some("deleted earlier"), 1, 0, apple_nanos(2022, 12, 1, 10)),
    ];
    for (row_id, guid, text, handle_id, is_from_me, date) in messages {
        conn.execute(
            "INSERT INTO message (ROWID, guid, text, service, handle_id, is_from_me, destination_caller_id,
                                  date, is_delivered, is_sent)
             VALUES (?1, ?2, ?3, 'iMessage', ?4, ?5, ?6, ?7, 1, ?5)",
            params![row_id, guid, text, handle_id, is_from_me, ME, date],
        )
        .unwrap();
    }

    // created_date in whole seconds since 2001
    conn.execute(
        "INSERT INTO attachment (ROWID, guid, created_date, filename, mime_type, uti, transfer_name,
                                 total_bytes, transfer_state)
         VALUES (1, 'at_0_MSG-3', ?1, '~/Library/Messages/Attachments/ab/IMG_0001.HEIC', 'image/heic',
                 'public.heic', 'IMG_0001.HEIC', 2048, 5)",
        params![unix_at(2023, 2, 1, 8) - APPLE_EPOCH],
    )
    .unwrap();
    conn.execute("INSERT INTO message_attachment_join (message_id, attachment_id) VALUES (3, 1)", []).unwrap();

    conn.execute(
        "INSERT INTO chat_recoverable_message_join (chat_id, message_id, delete_date) VALUES
            (1, 5, ?1), (2, 4, ?2)",
        params![apple_nanos(2023, 1, 1, 0), apple_nanos(2023, 3, 2, 0)],
    )
    .unwrap();
}
