use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::{Component, Path};

use crate::models::DateRange;

/// Longest accepted search term, in characters
pub const MAX_SEARCH_TERM_CHARS: usize = 256;

/// Accepted date format for `--date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation utilities for command-line input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a search term
    pub fn validate_search_term(term: &str) -> Result<()> {
        if term.trim().is_empty() {
            return Err(anyhow!("Search term cannot be empty"));
        }

        if term.chars().count() > MAX_SEARCH_TERM_CHARS {
            return Err(anyhow!("Search term too long (max {MAX_SEARCH_TERM_CHARS} characters)"));
        }

        if term.chars().any(char::is_control) {
            return Err(anyhow!("Search term contains control characters"));
        }

        Ok(())
    }

    /// Parse a `YYYY-MM-DD` date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
    }

    /// Validate date range ordering.
    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(anyhow!("Start date cannot be after end date"));
        }

        if end > Utc::now().date_naive() {
            tracing::warn!(%end, "Date range ends in the future");
        }

        let days = (end - start).num_days();
        if days > 365 * 20 {
            tracing::warn!(days, "Large date range; the message query may be slow");
        }

        Ok(())
    }

    /// Parse and validate `--date <start> <end>`
    pub fn parse_date_range(start: &str, end: &str) -> Result<DateRange> {
        let start = Self::parse_date(start)?;
        let end = Self::parse_date(end)?;
        Self::validate_date_range(start, end)?;
        Ok(DateRange { start, end })
    }

    /// Validate an output or store path
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }

        if path.components().any(|component| component == Component::ParentDir) {
            return Err(anyhow!("File path must not contain '..' components"));
        }

        if path_str.len() > 4096 {
            return Err(anyhow!("File path too long (max 4096 characters)"));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars().filter(|c| !c.is_control()).collect::<String>().trim().to_string()
    }
}
