//! Extraction session: fetch, assemble and package every requested section.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::PermissionProbe;
use crate::assembler::{
    assemble_attachment, assemble_contacts, assemble_hidden_message, assemble_message, assemble_thread,
    order_by_delete_date_desc,
};
use crate::db::QueryExecutor;
use crate::drafts::{assemble_drafts, DraftArtifactReader};
use crate::error::Result;
use crate::handles::HandleDirectory;
use crate::logging::OperationTimer;
use crate::metrics::{MetricsCollector, RunTallies};
use crate::models::{DateRange, MessageFilter, RecordKind};
use crate::records::{DataSections, JobInfo, QueryInfo, RunEnvelope};
use crate::repository::ChatRepository;
use crate::timestamp::format_canonical;

/// What one run should extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Sections to produce, in output order
    pub kinds: BTreeSet<RecordKind>,
    /// Search term; its presence adds the search section
    pub search: Option<String>,
    /// Restricts messages and search hits
    pub date_range: Option<DateRange>,
}

impl ExtractionRequest {
    /// Request the given sections
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = RecordKind>) -> Self {
        Self { kinds: kinds.into_iter().collect(), ..Self::default() }
    }

    /// Every section except search
    #[must_use]
    pub fn all() -> Self {
        Self::new(RecordKind::ALL)
    }

    /// Also run a search for `term`
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self.kinds.insert(RecordKind::Search);
        self
    }

    /// Restrict messages and search to `range`
    #[must_use]
    pub const fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// True when nothing was asked for
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn needs_store(&self) -> bool {
        self.kinds.iter().any(|kind| kind.is_store_backed())
    }

    fn needs_directory(&self) -> bool {
        self.kinds.iter().any(|kind| {
            matches!(kind, RecordKind::Messages | RecordKind::Search | RecordKind::Attachments | RecordKind::HiddenMessages)
        })
    }
}

/// Runs extractions against one store and one drafts directory.
///
/// Failures never abort a run: a failed fetch leaves its section present but
/// empty, and a denied permission probe empties every store-backed section.
pub struct ExtractionService<E, P> {
    repository: ChatRepository<E>,
    probe: P,
    drafts: Box<dyn DraftArtifactReader>,
    source_db: String,
    metrics: MetricsCollector,
}

impl<E: QueryExecutor, P: PermissionProbe> ExtractionService<E, P> {
    /// Build a service over a store, its access probe and a drafts reader.
    ///
    /// `source_db` is only reported in the envelope.
    pub fn new(executor: E, probe: P, drafts: Box<dyn DraftArtifactReader>, source_db: impl Into<String>) -> Self {
        Self {
            repository: ChatRepository::new(executor),
            probe,
            drafts,
            source_db: source_db.into(),
            metrics: MetricsCollector::new(),
        }
    }

    /// Tallies accumulated over every run of this service
    #[must_use]
    pub fn tallies(&self) -> RunTallies {
        self.metrics.tallies()
    }

    /// Run one extraction and package it in an envelope.
    pub fn run(&self, request: &ExtractionRequest) -> RunEnvelope {
        let job_id = format!("JOB-{}", Uuid::new_v4().to_string().to_uppercase());
        let granted = !request.needs_store() || self.probe.is_granted();
        if !granted {
            warn!(source_db = %self.source_db, "Chat store access denied; store sections will be empty");
        }

        let directory = if granted && request.needs_directory() { self.load_directory() } else { HandleDirectory::empty() };

        let message_filter = MessageFilter { search: None, date_range: request.date_range };
        let search_filter = MessageFilter { search: request.search.clone(), date_range: request.date_range };

        let mut data = DataSections::default();
        for &kind in &request.kinds {
            let timer = OperationTimer::new(kind.section_name());
            match kind {
                RecordKind::Drafts => data.drafts = Some(self.drafts_section(&job_id)),
                _ if !granted => set_empty(&mut data, kind),
                RecordKind::Messages => {
                    data.messages = Some(self.section(
                        kind,
                        || self.repository.messages(&message_filter),
                        |rows| rows.iter().map(|row| assemble_message(row, &directory)).collect(),
                    ));
                }
                RecordKind::Search => {
                    data.search = Some(self.section(
                        kind,
                        || self.repository.search(&search_filter),
                        |rows| rows.iter().map(|row| assemble_message(row, &directory)).collect(),
                    ));
                }
                RecordKind::Attachments => {
                    data.attachments = Some(self.section(
                        kind,
                        || self.repository.attachments(),
                        |rows| rows.iter().map(|row| assemble_attachment(row, &directory)).collect(),
                    ));
                }
                RecordKind::HiddenMessages => {
                    data.hidden_messages = Some(self.section(
                        kind,
                        || self.repository.hidden_messages(),
                        |rows| {
                            let mut records: Vec<_> =
                                rows.iter().map(|row| assemble_hidden_message(row, &directory)).collect();
                            order_by_delete_date_desc(&mut records);
                            records
                        },
                    ));
                }
                RecordKind::Contacts => {
                    data.contacts = Some(self.section(kind, || self.repository.contacts(), |rows| assemble_contacts(&rows)));
                }
                RecordKind::Threads => {
                    data.threads = Some(self.section(
                        kind,
                        || self.repository.threads(),
                        |rows| rows.iter().map(assemble_thread).collect(),
                    ));
                }
            }
            self.metrics.record_section_duration(kind, timer.elapsed());
            timer.finish();
        }

        let tallies = self.metrics.tallies();
        info!(
            job_id = %job_id,
            rows_fetched = tallies.rows_fetched,
            records_assembled = tallies.records_assembled,
            fetch_failures = tallies.fetch_failures,
            draft_failures = tallies.draft_failures,
            "Extraction complete"
        );

        RunEnvelope { job: self.job_info(job_id, request), data }
    }

    fn load_directory(&self) -> HandleDirectory {
        match self.repository.handle_directory() {
            Ok(directory) => {
                info!(handles = directory.len(), "Loaded handle directory");
                directory
            }
            Err(e) => {
                warn!(error = %e, "Failed to load handles; participant identities will be empty");
                self.metrics.record_fetch_failure("handles");
                HandleDirectory::empty()
            }
        }
    }

    fn section<R, T>(
        &self,
        kind: RecordKind,
        fetch: impl FnOnce() -> Result<Vec<R>>,
        assemble: impl FnOnce(Vec<R>) -> Vec<T>,
    ) -> Vec<T> {
        match fetch() {
            Ok(rows) => {
                self.metrics.record_rows_fetched(kind, rows.len());
                let records = assemble(rows);
                self.metrics.record_records_assembled(kind, records.len());
                records
            }
            Err(e) => {
                warn!(section = %kind, error = %e, "Fetch failed; section left empty");
                self.metrics.record_fetch_failure(kind.section_name());
                Vec::new()
            }
        }
    }

    fn drafts_section(&self, job_id: &str) -> Vec<crate::records::DraftRecord> {
        match assemble_drafts(self.drafts.as_ref(), job_id) {
            Ok(batch) => {
                self.metrics.record_draft_failures(batch.skipped);
                self.metrics.record_records_assembled(RecordKind::Drafts, batch.drafts.len());
                batch.drafts
            }
            Err(e) => {
                warn!(error = %e, "Failed to list drafts; section left empty");
                self.metrics.record_fetch_failure(RecordKind::Drafts.section_name());
                Vec::new()
            }
        }
    }

    fn job_info(&self, job_id: String, request: &ExtractionRequest) -> JobInfo {
        JobInfo {
            job_id,
            user: current_user(),
            pid: std::process::id(),
            query: QueryInfo {
                timestamp: format_canonical(&Utc::now()),
                source_db: self.source_db.clone(),
                query_type: request.kinds.iter().copied().collect(),
                search_term: request.search.clone(),
                date_range: request.date_range.map(|range| [range.start.to_string(), range.end.to_string()]),
            },
        }
    }
}

fn set_empty(data: &mut DataSections, kind: RecordKind) {
    match kind {
        RecordKind::Messages => data.messages = Some(Vec::new()),
        RecordKind::Attachments => data.attachments = Some(Vec::new()),
        RecordKind::Contacts => data.contacts = Some(Vec::new()),
        RecordKind::Threads => data.threads = Some(Vec::new()),
        RecordKind::HiddenMessages => data.hidden_messages = Some(Vec::new()),
        RecordKind::Drafts => data.drafts = Some(Vec::new()),
        RecordKind::Search => data.search = Some(Vec::new()),
    }
}

fn current_user() -> String {
    std::env::var("USER").or_else(|_| std::env::var("USERNAME")).unwrap_or_else(|_| "unknown".to_string())
}
