//! # tally-scan
//!
//! **Tier 1 (Adapter)**
//!
//! Raw record sources for the engine. The engine only ever sees
//! [`FileRecord`]s produced through the [`RecordSource`] trait, which keeps the
//! `tokei` dependency isolated to [`TokeiSource`].
//!
//! ## What belongs here
//! * Tokei configuration and invocation
//! * Mapping scan options to tokei config
//! * Turning tokei reports into records
//!
//! ## What does NOT belong here
//! * Business logic (filtering, sorting, aggregation)
//! * Receipt construction

mod memory;
mod tokei_source;

use thiserror::Error;

use tally_types::{FileRecord, ScanOptions};

pub use memory::MemorySource;
pub use tokei_source::{CHARS_PER_TOKEN, TokeiSource};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("scan failed: {0}")]
    Scan(String),
}

/// Anything that can produce counting records for a set of paths.
///
/// Implementations must return records in a deterministic order and must
/// report a requested path that does not exist as [`ScanError::PathNotFound`]
/// and one that exists but cannot be read as [`ScanError::Scan`].
pub trait RecordSource: Send + Sync {
    fn collect(&self, paths: &[String], options: &ScanOptions)
    -> Result<Vec<FileRecord>, ScanError>;
}

/// Canonical record order: path, then language, then parent before child.
pub fn sort_records(records: &mut [FileRecord]) {
    records.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.language.cmp(&b.language))
            .then_with(|| a.kind.cmp(&b.kind))
    });
}
