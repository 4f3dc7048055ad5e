//! Read-permission check for the chat store.
//!
//! On macOS the store is protected by Full Disk Access; without it the file
//! exists but cannot be opened. The probe only answers "can this process read
//! the file", it never tries to obtain access.

use std::fs::File;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Answers whether the chat store can be read.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionProbe {
    /// True when the store is readable
    fn is_granted(&self) -> bool;
}

/// Probes by opening the store file for reading.
#[derive(Debug, Clone)]
pub struct ChatDbAccessProbe {
    path: PathBuf,
}

impl ChatDbAccessProbe {
    /// Probe that tries to open the store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PermissionProbe for ChatDbAccessProbe {
    fn is_granted(&self) -> bool {
        match File::open(&self.path) {
            Ok(_) => {
                debug!(path = %self.path.display(), "Chat store is readable");
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Chat store is not readable; grant Full Disk Access");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_readable_file_is_granted() {
        let file = NamedTempFile::new().unwrap();
        assert!(ChatDbAccessProbe::new(file.path()).is_granted());
    }

    #[test]
    fn test_missing_file_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ChatDbAccessProbe::new(dir.path().join("chat.db")).is_granted());
    }
}
