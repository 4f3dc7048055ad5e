//! Unsent draft recovery.
//!
//! Messages keeps one `composition.plist` per account directory under
//! `~/Library/Messages/Drafts`. The outer property list wraps an
//! `NSKeyedArchiver` payload as a data blob; the draft text and any attachment
//! file URLs live in that payload's `$objects` table.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::SystemTime;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use plist::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MsgIntelError, Result};
use crate::records::{
    DraftCommunication, DraftContent, DraftData, DraftDelivery, DraftReceiver, DraftRecord, DraftSource, DraftState,
    DraftStatus,
};
use crate::timestamp::system_time_to_iso;

/// File name of the archived composition inside an account directory
pub const COMPOSITION_FILE: &str = "composition.plist";

/// Sub-directory that exists when the draft has attachments staged
pub const ATTACHMENTS_DIR: &str = "Attachments";

/// Account directory used for drafts that are waiting to be sent
pub const PENDING_ACCOUNT: &str = "Pending";

const FILE_URL_MARKER: &str = "CKCompositionFileURL";
const FILE_URL_PREFIX: &str = "file://";

/// One account's composition artifact as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftArtifact {
    /// Account directory name
    pub account: String,
    /// Path of the composition file
    pub path: PathBuf,
    /// Raw composition plist
    pub bytes: Vec<u8>,
    /// File creation time, when the platform reports it
    pub created: Option<SystemTime>,
    /// When it was last modified
    pub modified: Option<SystemTime>,
    /// An `Attachments` directory sits beside the composition
    pub has_attachments: bool,
}

/// Enumerates draft artifacts.
pub trait DraftArtifactReader {
    /// Account directory names
    fn list_accounts(&self) -> Result<Vec<String>>;

    /// The account's composition, or `None` when it is missing or unreadable
    fn read_composition(&self, account: &str) -> Option<DraftArtifact>;
}

/// Reads drafts from a directory tree on the local file system.
#[derive(Debug, Clone)]
pub struct FsDraftReader {
    root: PathBuf,
}

impl FsDraftReader {
    /// Reader rooted at a `Drafts` directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DraftArtifactReader for FsDraftReader {
    fn list_accounts(&self) -> Result<Vec<String>> {
        let mut accounts = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                accounts.push(name.to_string());
            }
        }
        accounts.sort();
        Ok(accounts)
    }

    fn read_composition(&self, account: &str) -> Option<DraftArtifact> {
        let account_dir = self.root.join(account);
        let path = account_dir.join(COMPOSITION_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(account, error = %e, "No readable composition");
                return None;
            }
        };
        let metadata = fs::metadata(&path).ok();

        Some(DraftArtifact {
            account: account.to_string(),
            created: metadata.as_ref().and_then(|m| m.created().ok()),
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            has_attachments: account_dir.join(ATTACHMENTS_DIR).exists(),
            path,
            bytes,
        })
    }
}

/// What a composition archive decodes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedComposition {
    /// Draft text, empty when the archive holds none
    pub text: String,
    /// `file://` URLs of staged attachments
    pub attachments: Vec<String>,
    /// The inner archive bytes
    pub archive: Vec<u8>,
}

/// Decode a composition file.
///
/// The first data blob found in the outer property list is the archive. An
/// outer list that is itself an archive (has `$objects`) is used directly.
pub fn decode_composition(bytes: &[u8]) -> Result<DecodedComposition> {
    let outer = Value::from_reader(Cursor::new(bytes))?;

    let embedded = first_data_blob(&outer).map(<[u8]>::to_vec);
    let (archive, archive_bytes) = match embedded {
        Some(data) => (Value::from_reader(Cursor::new(&data))?, data),
        None if objects_of(&outer).is_some() => (outer, bytes.to_vec()),
        None => return Err(MsgIntelError::MalformedArchive("no embedded archive".to_string())),
    };

    let objects =
        objects_of(&archive).ok_or_else(|| MsgIntelError::MalformedArchive("archive has no $objects".to_string()))?;

    let text = objects
        .iter()
        .filter_map(Value::as_dictionary)
        .find_map(|object| object.get("NS.string").and_then(Value::as_string).filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string();

    let strings = || objects.iter().filter_map(Value::as_string);
    let attachments = if strings().any(|s| s == FILE_URL_MARKER) {
        strings().filter(|s| s.starts_with(FILE_URL_PREFIX)).map(String::from).collect()
    } else {
        Vec::new()
    };

    Ok(DecodedComposition { text, attachments, archive: archive_bytes })
}

fn objects_of(value: &Value) -> Option<&Vec<Value>> {
    value.as_dictionary()?.get("$objects")?.as_array()
}

fn first_data_blob(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Data(data) => Some(data.as_slice()),
        Value::Array(items) => items.iter().find_map(first_data_blob),
        Value::Dictionary(dict) => dict.values().find_map(first_data_blob),
        _ => None,
    }
}

/// Service inferred from the account directory name.
#[must_use]
pub fn service_for_account(account: &str) -> &'static str {
    if account.contains('@') {
        "iMessage"
    } else {
        "SMS"
    }
}

/// Build a draft record from an artifact.
pub fn assemble_draft(artifact: &DraftArtifact, job_id: &str) -> Result<DraftRecord> {
    let decoded = decode_composition(&artifact.bytes)?;
    let encoded_data = STANDARD.encode(&decoded.archive);

    Ok(DraftRecord {
        draft_id: format!("DRAFT-{}", Uuid::new_v4().to_string().to_uppercase()),
        job_id: job_id.to_string(),
        source: DraftSource {
            source_type: "plist".to_string(),
            directory: artifact.account.clone(),
            path: artifact.path.display().to_string(),
        },
        communication: DraftCommunication {
            receiver: DraftReceiver {
                account: artifact.account.clone(),
                service: service_for_account(&artifact.account).to_string(),
            },
        },
        content: DraftContent {
            data: DraftData {
                text: decoded.text,
                format: "NSKeyedArchiver".to_string(),
                encoding_method: "base64".to_string(),
                mime_type: "application/x-plist".to_string(),
                data_length: encoded_data.len(),
                encoded_data,
            },
            attachments: decoded.attachments,
        },
        status: DraftStatus {
            delivery: DraftDelivery { is_pending: artifact.account == PENDING_ACCOUNT, ..DraftDelivery::default() },
            state: DraftState {
                has_attachments: artifact.has_attachments,
                created: artifact.created.map(system_time_to_iso),
                last_modified: artifact.modified.map(system_time_to_iso),
            },
        },
    })
}

/// Drafts recovered in one pass, plus the number of accounts skipped.
#[derive(Debug, Clone, Default)]
pub struct DraftBatch {
    /// Decoded drafts, in account order
    pub drafts: Vec<DraftRecord>,
    /// Accounts with a missing or corrupt artifact
    pub skipped: usize,
}

/// Recover every account's draft. A missing or corrupt artifact skips only
/// that account.
pub fn assemble_drafts(reader: &dyn DraftArtifactReader, job_id: &str) -> Result<DraftBatch> {
    let mut batch = DraftBatch::default();

    for account in reader.list_accounts()? {
        let Some(artifact) = reader.read_composition(&account) else {
            batch.skipped += 1;
            continue;
        };
        match assemble_draft(&artifact, job_id) {
            Ok(draft) => batch.drafts.push(draft),
            Err(e) => {
                warn!(account = %account, error = %e, "Skipping unreadable draft");
                batch.skipped += 1;
            }
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::Dictionary;

    fn archive(objects: Vec<Value>) -> Vec<u8> {
        let mut dict = Dictionary::new();
        dict.insert("$archiver".to_string(), Value::String("NSKeyedArchiver".to_string()));
        dict.insert("$objects".to_string(), Value::Array(objects));
        let mut bytes = Vec::new();
        Value::Dictionary(dict).to_writer_binary(&mut bytes).unwrap_or_default();
        bytes
    }

    fn wrapped(inner: Vec<u8>) -> Vec<u8> {
        let mut dict = Dictionary::new();
        dict.insert("text".to_string(), Value::Data(inner));
        let mut bytes = Vec::new();
        Value::Dictionary(dict).to_writer_xml(&mut bytes).unwrap_or_default();
        bytes
    }

    fn ns_string(text: &str) -> Value {
        let mut dict = Dictionary::new();
        dict.insert("NS.string".to_string(), Value::String(text.to_string()));
        Value::Dictionary(dict)
    }

    #[test]
    fn test_decode_wrapped_text() {
        let inner = archive(vec![Value::String("$null".to_string()), ns_string("see you at 5")]);
        let decoded = decode_composition(&wrapped(inner.clone())).unwrap_or_default();
        assert_eq!(decoded.text, "see you at 5");
        assert!(decoded.attachments.is_empty());
        assert_eq!(decoded.archive, inner);
    }

    #[test]
    fn test_file_urls_need_marker() {
        let urls = vec![
            ns_string("pic"),
            Value::String("file:///tmp/a.jpg".to_string()),
            Value::String("file:///tmp/b.jpg".to_string()),
        ];
        let without_marker = decode_composition(&wrapped(archive(urls.clone()))).unwrap_or_default();
        assert!(without_marker.attachments.is_empty());

        let mut with_marker = urls;
        with_marker.push(Value::String("CKCompositionFileURL".to_string()));
        let decoded = decode_composition(&wrapped(archive(with_marker))).unwrap_or_default();
        assert_eq!(decoded.attachments, ["file:///tmp/a.jpg", "file:///tmp/b.jpg"]);
    }

    #[test]
    fn test_bare_archive_is_accepted() {
        let decoded = decode_composition(&archive(vec![ns_string("direct")])).unwrap_or_default();
        assert_eq!(decoded.text, "direct");
    }

    #[test]
    fn test_missing_text_is_empty() {
        let decoded = decode_composition(&wrapped(archive(vec![Value::Integer(1_i64.into())]))).unwrap_or_default();
        assert_eq!(decoded.text, "");
    }

    #[test]
    fn test_corrupt_input_errors() {
        assert!(decode_composition(b"definitely not a plist").is_err());

        let mut dict = Dictionary::new();
        dict.insert("k".to_string(), Value::String("v".to_string()));
        let mut bytes = Vec::new();
        Value::Dictionary(dict).to_writer_xml(&mut bytes).unwrap_or_default();
        assert!(matches!(decode_composition(&bytes), Err(MsgIntelError::MalformedArchive(_))));
    }

    #[test]
    fn test_service_for_account() {
        assert_eq!(service_for_account("me@icloud.com"), "iMessage");
        assert_eq!(service_for_account("+15551234567"), "SMS");
        assert_eq!(service_for_account(PENDING_ACCOUNT), "SMS");
    }

    #[test]
    fn test_assemble_draft_record() {
        let inner = archive(vec![ns_string("hello")]);
        let artifact = DraftArtifact {
            account: PENDING_ACCOUNT.to_string(),
            path: PathBuf::from("/drafts/Pending/composition.plist"),
            bytes: wrapped(inner.clone()),
            created: Some(SystemTime::UNIX_EPOCH),
            modified: None,
            has_attachments: true,
        };

        let draft = assemble_draft(&artifact, "JOB-1");
        let draft = draft.unwrap_or_default();
        assert!(draft.draft_id.starts_with("DRAFT-"));
        assert_eq!(draft.job_id, "JOB-1");
        assert_eq!(draft.content.data.text, "hello");
        assert_eq!(draft.content.data.encoded_data, STANDARD.encode(&inner));
        assert_eq!(draft.content.data.data_length, draft.content.data.encoded_data.len());
        assert!(draft.status.delivery.is_pending);
        assert!(!draft.status.delivery.is_sent);
        assert!(draft.status.state.has_attachments);
        assert_eq!(draft.status.state.created.as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(draft.communication.receiver.service, "SMS");
    }
}
