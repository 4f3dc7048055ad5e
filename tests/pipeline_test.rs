mod common;

use chrono::NaiveDate;
use common::{ChatDbFixture, FRIEND, ME, PHONE};
use mockall::mock;
use std::path::PathBuf;

use msg_intel::access::{ChatDbAccessProbe, PermissionProbe};
use msg_intel::db::{ChatDatabase, QueryExecutor, QuerySpec, UnavailableStore};
use msg_intel::drafts::{DraftArtifact, DraftArtifactReader, FsDraftReader};
use msg_intel::models::{DateRange, RawRow};
use msg_intel::render::render;
use msg_intel::{ExtractionRequest, ExtractionService, MsgIntelError, RecordKind, RenderFormat, Result};

mock! {
    Probe {}
    impl PermissionProbe for Probe {
        fn is_granted(&self) -> bool;
    }
}

mock! {
    Store {}
    impl QueryExecutor for Store {
        fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRow>>;
    }
}

/// Drafts reader with no accounts
struct NoDrafts;

impl DraftArtifactReader for NoDrafts {
    fn list_accounts(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn read_composition(&self, _account: &str) -> Option<DraftArtifact> {
        None
    }
}

/// Drafts reader with one account whose artifact is garbage
struct CorruptDraft;

impl DraftArtifactReader for CorruptDraft {
    fn list_accounts(&self) -> Result<Vec<String>> {
        Ok(vec![PHONE.to_string()])
    }

    fn read_composition(&self, account: &str) -> Option<DraftArtifact> {
        Some(DraftArtifact {
            account: account.to_string(),
            path: PathBuf::from(account).join("composition.plist"),
            bytes: b"garbage".to_vec(),
            created: None,
            modified: None,
            has_attachments: false,
        })
    }
}

/// Real store whose thread query always fails
struct ThreadsBroken(ChatDatabase);

impl QueryExecutor for ThreadsBroken {
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRow>> {
        match spec {
            QuerySpec::Threads => Err(MsgIntelError::StoreUnavailable("disk I/O error".to_string())),
            other => self.0.fetch(other),
        }
    }
}

fn service(fixture: &ChatDbFixture) -> ExtractionService<ChatDatabase, ChatDbAccessProbe> {
    ExtractionService::new(
        ChatDatabase::open(fixture.path()).unwrap(),
        ChatDbAccessProbe::new(fixture.path()),
        Box::new(NoDrafts),
        fixture.path().display().to_string(),
    )
}

#[test]
fn test_full_run_against_store() {
    let fixture = ChatDbFixture::new();
    let envelope = service(&fixture).run(&ExtractionRequest::all().with_search("lunch"));
    let data = &envelope.data;

    let messages = data.messages.as_ref().unwrap();
    let guids: Vec<_> = messages.iter().filter_map(|m| m.guid.as_deref()).collect();
    assert_eq!(guids, ["MSG-5", "MSG-1", "MSG-2", "MSG-4"]);

    let incoming = &messages[1];
    assert_eq!(incoming.timestamps.date.as_deref(), Some("2023-01-15T12:00:00.000Z"));
    assert_eq!(incoming.communication.sender.phone_number.as_deref(), Some(PHONE));
    assert_eq!(incoming.communication.sender.country.as_deref(), Some("us"));
    assert_eq!(incoming.communication.sender.handle_id, Some(1));
    assert_eq!(incoming.communication.receiver.email.as_deref(), Some(ME));
    assert_eq!(incoming.communication.receiver.handle_id, None);
    assert_eq!(incoming.communication.channel.chat_identifier.as_deref(), Some(PHONE));

    let outgoing = &messages[2];
    assert!(outgoing.communication.channel.is_from_me);
    assert_eq!(outgoing.communication.sender.email.as_deref(), Some(ME));
    assert_eq!(outgoing.communication.receiver.phone_number.as_deref(), Some(PHONE));
    assert_eq!(outgoing.communication.receiver.handle_id, Some(1));

    let attachments = data.attachments.as_ref().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].message.guid.as_deref(), Some("MSG-3"));
    assert_eq!(attachments[0].created_date.as_deref(), Some("2023-02-01T08:00:00.000Z"));
    assert_eq!(attachments[0].metadata.mime_type.as_deref(), Some("image/heic"));
    assert_eq!(attachments[0].message.communication.sender.email.as_deref(), Some(FRIEND));

    let hidden = data.hidden_messages.as_ref().unwrap();
    let hidden_guids: Vec<_> = hidden.iter().filter_map(|m| m.guid.as_deref()).collect();
    assert_eq!(hidden_guids, ["MSG-4", "MSG-5"]);
    assert_eq!(hidden[0].timeline.delete_date.as_deref(), Some("2023-03-02T00:00:00.000Z"));
    assert_eq!(hidden[0].context.chat_identifier.as_deref(), Some("chat42"));

    let contacts = data.contacts.as_ref().unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].contact_info.phone_number.as_deref(), Some(PHONE));
    assert_eq!(contacts[0].relationships.shared_chats.len(), 2);
    let mut styles = contacts[0].relationships.chat_styles.clone();
    styles.sort_unstable();
    assert_eq!(styles, [43, 45]);
    assert_eq!(contacts[1].contact_info.email.as_deref(), Some(FRIEND));
    assert_eq!(contacts[1].stats.types.attachment, 1);

    let threads = data.threads.as_ref().unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].last_message_date.as_deref(), Some("2023-01-16T09:00:00.000Z"));

    let search = data.search.as_ref().unwrap();
    let search_guids: Vec<_> = search.iter().filter_map(|m| m.guid.as_deref()).collect();
    assert_eq!(search_guids, ["MSG-1", "MSG-4"]);

    assert_eq!(data.drafts.as_ref().map(Vec::len), Some(0));

    let job = &envelope.job;
    assert!(job.job_id.starts_with("JOB-"));
    assert_eq!(job.pid, std::process::id());
    assert_eq!(job.query.search_term.as_deref(), Some("lunch"));
    assert_eq!(job.query.query_type.len(), 7);
    assert_eq!(job.query.source_db, fixture.path().display().to_string());
}

#[test]
fn test_date_range_restricts_messages_and_search() {
    let fixture = ChatDbFixture::new();
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
    };
    let request = ExtractionRequest::new([RecordKind::Messages]).with_search("lunch").with_date_range(range);
    let envelope = service(&fixture).run(&request);

    let messages = envelope.data.messages.unwrap();
    assert_eq!(messages.iter().filter_map(|m| m.guid.as_deref()).collect::<Vec<_>>(), ["MSG-1", "MSG-2"]);
    assert_eq!(envelope.data.search.unwrap().len(), 1);
    assert_eq!(envelope.job.query.date_range, Some(["2023-01-01".to_string(), "2023-01-31".to_string()]));
    assert!(envelope.data.attachments.is_none());
}

#[test]
fn test_denied_access_empties_store_sections() {
    let fixture = ChatDbFixture::new();
    let mut probe = MockProbe::new();
    probe.expect_is_granted().times(1).return_const(false);

    let service = ExtractionService::new(
        ChatDatabase::open(fixture.path()).unwrap(),
        probe,
        Box::new(NoDrafts),
        "chat.db",
    );
    let envelope = service.run(&ExtractionRequest::all());

    for kind in [RecordKind::Messages, RecordKind::Attachments, RecordKind::Contacts, RecordKind::Threads, RecordKind::HiddenMessages]
    {
        assert_eq!(envelope.data.count(kind), Some(0), "{kind}");
    }
    assert_eq!(envelope.data.count(RecordKind::Drafts), Some(0));
    assert_eq!(service.tallies().rows_fetched, 0);
}

#[test]
fn test_drafts_only_never_touches_the_store() {
    let mut store = MockStore::new();
    store.expect_fetch().never();
    let mut probe = MockProbe::new();
    probe.expect_is_granted().never();

    let drafts_root = tempfile::tempdir().unwrap();
    let service = ExtractionService::new(store, probe, Box::new(FsDraftReader::new(drafts_root.path())), "chat.db");
    let envelope = service.run(&ExtractionRequest::new([RecordKind::Drafts]));

    assert_eq!(envelope.data.count(RecordKind::Drafts), Some(0));
    assert!(envelope.data.messages.is_none());
}

#[test]
fn test_unavailable_store_degrades_every_section() {
    let probe_target = tempfile::NamedTempFile::new().unwrap();
    let service = ExtractionService::new(
        UnavailableStore::new("unable to open database file"),
        ChatDbAccessProbe::new(probe_target.path()),
        Box::new(CorruptDraft),
        "missing.db",
    );
    let envelope = service.run(&ExtractionRequest::all().with_search("x"));

    for kind in RecordKind::ALL.into_iter().chain([RecordKind::Search]) {
        assert_eq!(envelope.data.count(kind), Some(0), "{kind}");
    }
    let tallies = service.tallies();
    // handles plus six store-backed sections
    assert_eq!(tallies.fetch_failures, 7);
    assert_eq!(tallies.draft_failures, 1);
}

#[test]
fn test_one_failed_fetch_leaves_other_sections_intact() {
    let fixture = ChatDbFixture::new();
    let service = ExtractionService::new(
        ThreadsBroken(ChatDatabase::open(fixture.path()).unwrap()),
        ChatDbAccessProbe::new(fixture.path()),
        Box::new(NoDrafts),
        "chat.db",
    );
    let envelope = service.run(&ExtractionRequest::new([RecordKind::Threads, RecordKind::Contacts]));

    assert_eq!(envelope.data.count(RecordKind::Threads), Some(0));
    assert_eq!(envelope.data.count(RecordKind::Contacts), Some(2));
    assert_eq!(service.tallies().fetch_failures, 1);
}

#[test]
fn test_json_envelope_shape() {
    let fixture = ChatDbFixture::new();
    let envelope = service(&fixture).run(&ExtractionRequest::new([RecordKind::Messages]));
    let value: serde_json::Value = serde_json::from_str(&render(&envelope, RenderFormat::Json).unwrap()).unwrap();

    let first = &value["data"]["messages"][0];
    assert_eq!(first["guid"], "MSG-5");
    assert!(first["type"].is_object());
    assert_eq!(first["communication"]["receiver"]["email"], ME);
    assert_eq!(value["job"]["query"]["query_type"], serde_json::json!(["messages"]));
    assert!(value["data"].get("threads").is_none());
}

#[test]
fn test_tabular_run_output() {
    let fixture = ChatDbFixture::new();
    let envelope = service(&fixture).run(&ExtractionRequest::new([RecordKind::Messages, RecordKind::Contacts]));
    let rendered = render(&envelope, RenderFormat::List).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "GUID|MESSAGE|DATE|SERVICE|SENDER|RECEIVER");
    assert_eq!(lines[2], format!("MSG-1|Lunch at noon?|2023-01-15T12:00:00.000Z|iMessage|{PHONE}|{ME}"));
}
