use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use plist::{Dictionary, Value};
use std::fs;
use std::path::Path;

use msg_intel::drafts::{assemble_drafts, DraftArtifactReader, FsDraftReader, ATTACHMENTS_DIR, COMPOSITION_FILE};

fn keyed_archive(objects: Vec<Value>) -> Vec<u8> {
    let mut dict = Dictionary::new();
    dict.insert("$archiver".to_string(), Value::String("NSKeyedArchiver".to_string()));
    dict.insert("$version".to_string(), Value::Integer(100_000_i64.into()));
    dict.insert("$objects".to_string(), Value::Array(objects));
    let mut bytes = Vec::new();
    Value::Dictionary(dict).to_writer_binary(&mut bytes).unwrap();
    bytes
}

fn text_object(text: &str) -> Value {
    let mut dict = Dictionary::new();
    dict.insert("NS.string".to_string(), Value::String(text.to_string()));
    Value::Dictionary(dict)
}

/// Outer composition plist wrapping the archive as a data blob
fn composition(archive: &[u8]) -> Vec<u8> {
    let mut dict = Dictionary::new();
    dict.insert("text".to_string(), Value::Data(archive.to_vec()));
    let mut bytes = Vec::new();
    Value::Dictionary(dict).to_writer_binary(&mut bytes).unwrap();
    bytes
}

fn write_account(root: &Path, account: &str, bytes: &[u8]) {
    let dir = root.join(account);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(COMPOSITION_FILE), bytes).unwrap();
}

#[test]
fn test_lists_account_directories_sorted() {
    let root = tempfile::tempdir().unwrap();
    for account in ["zed@example.com", "+15551234567", "Pending"] {
        fs::create_dir_all(root.path().join(account)).unwrap();
    }
    fs::write(root.path().join(".DS_Store"), b"junk").unwrap();

    let accounts = FsDraftReader::new(root.path()).list_accounts().unwrap();
    assert_eq!(accounts, ["+15551234567", "Pending", "zed@example.com"]);
}

#[test]
fn test_missing_root_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(FsDraftReader::new(root.path().join("Drafts")).list_accounts().is_err());
}

#[test]
fn test_read_composition_metadata() {
    let root = tempfile::tempdir().unwrap();
    write_account(root.path(), "friend@example.com", b"payload");
    fs::create_dir_all(root.path().join("friend@example.com").join(ATTACHMENTS_DIR)).unwrap();
    fs::create_dir_all(root.path().join("+15551234567")).unwrap();

    let reader = FsDraftReader::new(root.path());
    let artifact = reader.read_composition("friend@example.com").unwrap();
    assert_eq!(artifact.bytes, b"payload");
    assert!(artifact.has_attachments);
    assert!(artifact.modified.is_some());
    assert!(artifact.path.ends_with(Path::new("friend@example.com").join(COMPOSITION_FILE)));

    assert!(reader.read_composition("+15551234567").is_none());
}

#[test]
fn test_drafts_from_directory_tree() {
    let root = tempfile::tempdir().unwrap();

    let sms_archive = keyed_archive(vec![Value::String("$null".to_string()), text_object("Running late")]);
    write_account(root.path(), "+15551234567", &composition(&sms_archive));

    let photo = "file:///Users/me/Library/Messages/Drafts/friend@example.com/Attachments/photo.jpg";
    let imessage_archive = keyed_archive(vec![
        Value::String("$null".to_string()),
        text_object("See attached"),
        Value::String("CKCompositionFileURL".to_string()),
        Value::String(photo.to_string()),
    ]);
    write_account(root.path(), "friend@example.com", &composition(&imessage_archive));
    fs::create_dir_all(root.path().join("friend@example.com").join(ATTACHMENTS_DIR)).unwrap();

    write_account(root.path(), "Pending", &composition(&keyed_archive(vec![text_object("queued")])));
    write_account(root.path(), "broken", b"not a property list");
    fs::create_dir_all(root.path().join("no-composition")).unwrap();

    let batch = assemble_drafts(&FsDraftReader::new(root.path()), "JOB-TEST").unwrap();
    assert_eq!(batch.skipped, 2);

    let accounts: Vec<_> = batch.drafts.iter().map(|d| d.communication.receiver.account.as_str()).collect();
    assert_eq!(accounts, ["+15551234567", "Pending", "friend@example.com"]);

    let sms = &batch.drafts[0];
    assert_eq!(sms.content.data.text, "Running late");
    assert_eq!(sms.communication.receiver.service, "SMS");
    assert_eq!(sms.source.directory, "+15551234567");
    assert_eq!(sms.job_id, "JOB-TEST");
    assert!(sms.draft_id.starts_with("DRAFT-"));
    assert_eq!(STANDARD.decode(&sms.content.data.encoded_data).unwrap(), sms_archive);
    assert_eq!(sms.content.data.data_length, sms.content.data.encoded_data.len());
    assert!(sms.content.attachments.is_empty());
    assert!(!sms.status.delivery.is_pending);
    assert!(!sms.status.state.has_attachments);

    let pending = &batch.drafts[1];
    assert!(pending.status.delivery.is_pending);
    assert_eq!(pending.communication.receiver.service, "SMS");

    let imessage = &batch.drafts[2];
    assert_eq!(imessage.communication.receiver.service, "iMessage");
    assert_eq!(imessage.content.attachments, [photo]);
    assert!(imessage.status.state.has_attachments);
    assert!(imessage.status.state.last_modified.as_deref().is_some_and(|t| t.ends_with('Z')));
}

#[test]
fn test_empty_drafts_directory() {
    let root = tempfile::tempdir().unwrap();
    let batch = assemble_drafts(&FsDraftReader::new(root.path()), "JOB-TEST").unwrap();
    assert!(batch.drafts.is_empty());
    assert_eq!(batch.skipped, 0);
}
