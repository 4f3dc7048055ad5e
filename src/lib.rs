//! msg-intel - iMessage history extraction and normalization
//!
//! A Rust library for turning a local Messages store (`chat.db`) and its draft
//! artifacts into canonical, analysis-ready records.
//!
//! # Features
//!
//! - Messages, attachments, contacts, threads and search hits from `chat.db`
//! - Recently deleted (recoverable) messages
//! - Unsent drafts decoded from `composition.plist` archives
//! - Sender/receiver resolution and timestamp normalization
//! - JSON output plus line, csv, column, html, insert and list renderings

/// Chat store read-permission probe
pub mod access;
/// Raw rows to canonical records
pub mod assembler;
/// Configuration management
pub mod config;
/// Chat store access
pub mod db;
/// Draft artifact decoding
pub mod drafts;
/// Error types
pub mod error;
/// Rendered output files
pub mod file_writer;
/// Session handle directory
pub mod handles;
/// Participant identity and direction
pub mod identity;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Raw row and request models
pub mod models;
/// Canonical record shapes
pub mod records;
/// Output rendering
pub mod render;
/// Typed access over the query executor
pub mod repository;
/// Chat store schema definitions
pub mod schema;
/// Extraction sessions
pub mod service;
/// Timestamp normalization
pub mod timestamp;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::{ChatDatabase, QueryExecutor, QuerySpec};
pub use error::{MsgIntelError, Result};
pub use models::{DateRange, RawRow, RecordKind, RenderFormat};
pub use records::RunEnvelope;
pub use service::{ExtractionRequest, ExtractionService};
