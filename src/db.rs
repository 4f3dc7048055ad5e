use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, ToSql};
use tracing::{debug, info};

use crate::error::{MsgIntelError, Result};
use crate::models::{MessageFilter, RawRow};
use crate::schema::queries;

/// A bulk query against the chat store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    /// Every handle, for the session directory
    Handles,
    /// Messages with text, optionally filtered
    Messages(MessageFilter),
    /// Messages matching a search term
    Search(MessageFilter),
    /// Attachments with their parent message
    Attachments,
    /// Recoverable messages
    HiddenMessages,
    /// Per-handle rollups
    Contacts,
    /// Chat summaries
    Threads,
}

impl QuerySpec {
    /// Short name for logs and metrics labels
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Handles => "handles",
            Self::Messages(_) => "messages",
            Self::Search(_) => "search",
            Self::Attachments => "attachments",
            Self::HiddenMessages => "hidden_messages",
            Self::Contacts => "contacts",
            Self::Threads => "threads",
        }
    }
}

/// Fetches raw rows from the chat store.
///
/// A fetch either returns the complete row set or fails; there is no partial result.
#[cfg_attr(test, mockall::automock)]
pub trait QueryExecutor {
    /// Run one bulk query
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRow>>;
}

/// Boxed positional parameters, bound in order
pub type QueryParams = Vec<Box<dyn ToSql>>;

/// Escape `LIKE` wildcards so the term matches literally; pair with `ESCAPE '\'`.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// SQL text and parameters for a query spec.
#[must_use]
pub fn build_query(spec: &QuerySpec) -> (String, QueryParams) {
    match spec {
        QuerySpec::Handles => (queries::HANDLES.to_string(), Vec::new()),
        QuerySpec::Attachments => (queries::ATTACHMENTS.to_string(), Vec::new()),
        QuerySpec::HiddenMessages => (queries::HIDDEN_MESSAGES.to_string(), Vec::new()),
        QuerySpec::Contacts => (queries::CONTACTS.to_string(), Vec::new()),
        QuerySpec::Threads => (queries::THREADS.to_string(), Vec::new()),
        QuerySpec::Messages(filter) => message_query(filter, true),
        QuerySpec::Search(filter) => message_query(filter, false),
    }
}

fn message_query(filter: &MessageFilter, require_text: bool) -> (String, QueryParams) {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: QueryParams = Vec::new();

    if require_text {
        conditions.push("m.text IS NOT NULL".to_string());
    }

    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(term));
        conditions.push(
            "(m.text LIKE ? ESCAPE '\\' OR m.guid LIKE ? ESCAPE '\\' \
             OR h.id LIKE ? ESCAPE '\\' OR m.destination_caller_id LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        for _ in 0..4 {
            params.push(Box::new(pattern.clone()));
        }
    }

    if let Some(range) = &filter.date_range {
        let windows = range.raw_windows();
        if windows.is_empty() {
            conditions.push("0".to_string());
        } else {
            conditions.push(format!("({})", vec!["m.date BETWEEN ? AND ?"; windows.len()].join(" OR ")));
        }
        for (low, high) in windows {
            params.push(Box::new(low));
            params.push(Box::new(high));
        }
    }

    let mut query = queries::MESSAGE_SELECT.to_string();
    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(queries::MESSAGE_ORDER);

    (query, params)
}

/// Read-only connection to a `chat.db`
pub struct ChatDatabase {
    conn: Connection,
    path: PathBuf,
}

impl ChatDatabase {
    /// Open the store read-only. Never creates or migrates anything.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|e| MsgIntelError::StoreUnavailable(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "Opened chat store");
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Path the store was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueryExecutor for ChatDatabase {
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRow>> {
        let (query, params) = build_query(spec);
        let mut stmt = self.conn.prepare(&query)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let row_iter = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            columns
                .iter()
                .enumerate()
                .map(|(index, name)| Ok((name.clone(), row.get::<_, Value>(index)?)))
                .collect::<rusqlite::Result<RawRow>>()
        })?;

        let mut results = Vec::new();
        for row in row_iter {
            results.push(row?);
        }

        debug!(query = spec.name(), rows = results.len(), "Fetched rows");
        Ok(results)
    }
}

/// Stand-in executor for a store that could not be opened: every fetch fails.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    /// A store that fails every fetch with `reason`
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl QueryExecutor for UnavailableStore {
    fn fetch(&self, _spec: &QuerySpec) -> Result<Vec<RawRow>> {
        Err(MsgIntelError::StoreUnavailable(self.reason.clone()))
    }
}
