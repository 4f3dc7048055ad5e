use tracing::debug;

use crate::db::{QueryExecutor, QuerySpec};
use crate::error::Result;
use crate::handles::HandleDirectory;
use crate::models::{AttachmentRow, ContactRow, HiddenMessageRow, MessageFilter, MessageRow, RawRow, ThreadRow};

/// Typed access to the chat store over any [`QueryExecutor`].
///
/// Each method issues exactly one bulk fetch and maps the rows best-effort;
/// only the fetch itself can fail.
pub struct ChatRepository<E> {
    executor: E,
}

impl<E: QueryExecutor> ChatRepository<E> {
    /// Wrap a query executor
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Access the underlying executor
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    fn fetch_mapped<T>(&self, spec: &QuerySpec, map: impl Fn(&RawRow) -> T) -> Result<Vec<T>> {
        let rows = self.executor.fetch(spec)?;
        debug!(query = spec.name(), rows = rows.len(), "Mapping rows");
        Ok(rows.iter().map(map).collect())
    }

    /// Load the handle directory. The caller decides what a failure means.
    pub fn handle_directory(&self) -> Result<HandleDirectory> {
        let rows = self.executor.fetch(&QuerySpec::Handles)?;
        Ok(HandleDirectory::from_rows(&rows))
    }

    /// Messages with text, filtered
    pub fn messages(&self, filter: &MessageFilter) -> Result<Vec<MessageRow>> {
        self.fetch_mapped(&QuerySpec::Messages(filter.clone()), MessageRow::from_raw)
    }

    /// Messages matching the filter's term
    pub fn search(&self, filter: &MessageFilter) -> Result<Vec<MessageRow>> {
        self.fetch_mapped(&QuerySpec::Search(filter.clone()), MessageRow::from_raw)
    }

    /// Attachments joined to their parent message
    pub fn attachments(&self) -> Result<Vec<AttachmentRow>> {
        self.fetch_mapped(&QuerySpec::Attachments, AttachmentRow::from_raw)
    }

    /// Recoverable messages
    pub fn hidden_messages(&self) -> Result<Vec<HiddenMessageRow>> {
        self.fetch_mapped(&QuerySpec::HiddenMessages, HiddenMessageRow::from_raw)
    }

    /// Per-handle rows with counters
    pub fn contacts(&self) -> Result<Vec<ContactRow>> {
        self.fetch_mapped(&QuerySpec::Contacts, ContactRow::from_raw)
    }

    /// Chats with message counts
    pub fn threads(&self) -> Result<Vec<ThreadRow>> {
        self.fetch_mapped(&QuerySpec::Threads, ThreadRow::from_raw)
    }
}
