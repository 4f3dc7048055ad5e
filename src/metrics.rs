use metrics::counter;
use std::cell::Cell;
use std::time::Duration;

use crate::models::RecordKind;

/// Metric names emitted by an extraction run
pub mod names {
    /// Rows read per section
    pub const ROWS_FETCHED: &str = "msg_intel_rows_fetched_total";
    /// Records produced per section
    pub const RECORDS_ASSEMBLED: &str = "msg_intel_records_assembled_total";
    /// Failed bulk fetches
    pub const FETCH_FAILURES: &str = "msg_intel_fetch_failures_total";
    /// Undecodable draft artifacts
    pub const DRAFT_FAILURES: &str = "msg_intel_draft_failures_total";
    /// Seconds spent per section
    pub const SECTION_DURATION: &str = "msg_intel_section_duration_seconds";
}

/// Local tallies of one run, reported in the summary log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTallies {
    /// Rows read from the store
    pub rows_fetched: u64,
    /// Records produced
    pub records_assembled: u64,
    /// Bulk fetches that failed
    pub fetch_failures: u64,
    /// Draft artifacts that could not be decoded
    pub draft_failures: u64,
}

/// Metrics collection for an extraction run.
///
/// Every record call goes to the global `metrics` recorder (a no-op unless the
/// embedding application installs one) and to a local tally.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    rows_fetched: Cell<u64>,
    records_assembled: Cell<u64>,
    fetch_failures: Cell<u64>,
    draft_failures: Cell<u64>,
}

fn bump(cell: &Cell<u64>, by: u64) {
    cell.set(cell.get().saturating_add(by));
}

impl MetricsCollector {
    /// A collector with zeroed tallies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record raw rows returned by a fetch
    pub fn record_rows_fetched(&self, kind: RecordKind, count: usize) {
        let count = count as u64;
        counter!(names::ROWS_FETCHED, "kind" => kind.to_string()).increment(count);
        bump(&self.rows_fetched, count);
    }

    /// Record canonical records produced for a section
    pub fn record_records_assembled(&self, kind: RecordKind, count: usize) {
        let count = count as u64;
        counter!(names::RECORDS_ASSEMBLED, "kind" => kind.to_string()).increment(count);
        bump(&self.records_assembled, count);
    }

    /// Record a fetch that failed; `query` is the failed query's name
    pub fn record_fetch_failure(&self, query: &'static str) {
        counter!(names::FETCH_FAILURES, "kind" => query).increment(1);
        bump(&self.fetch_failures, 1);
    }

    /// Record draft accounts that were skipped
    pub fn record_draft_failures(&self, count: usize) {
        if count == 0 {
            return;
        }
        let count = count as u64;
        counter!(names::DRAFT_FAILURES).increment(count);
        bump(&self.draft_failures, count);
    }

    /// Record how long a section took
    pub fn record_section_duration(&self, kind: RecordKind, duration: Duration) {
        metrics::histogram!(names::SECTION_DURATION, "kind" => kind.to_string()).record(duration.as_secs_f64());
    }

    /// Snapshot of the local tallies
    #[must_use]
    pub fn tallies(&self) -> RunTallies {
        RunTallies {
            rows_fetched: self.rows_fetched.get(),
            records_assembled: self.records_assembled.get(),
            fetch_failures: self.fetch_failures.get(),
            draft_failures: self.draft_failures.get(),
        }
    }
}
