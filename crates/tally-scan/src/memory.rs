use log::debug;

use tally_module_key::normalize_path;
use tally_types::{FileRecord, ScanOptions};

use crate::{RecordSource, ScanError, sort_records};

/// A record source backed by a fixed list of records.
///
/// Requested paths select records by path prefix (segment-wise); `"."` or an
/// empty request selects everything. Scan options other than `excluded` have
/// no meaning for pre-counted records and are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<FileRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<FileRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut r| {
                r.path = normalize_path(&r.path);
                r
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }
}

fn under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

fn excluded(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pat| {
        let pat = normalize_path(pat);
        !pat.is_empty() && (under(path, &pat) || path.split('/').any(|seg| seg == pat))
    })
}

impl RecordSource for MemorySource {
    fn collect(
        &self,
        paths: &[String],
        options: &ScanOptions,
    ) -> Result<Vec<FileRecord>, ScanError> {
        let prefixes: Vec<String> = if paths.is_empty() {
            vec![String::new()]
        } else {
            paths.iter().map(|p| normalize_path(p)).collect()
        };

        for (raw, prefix) in paths.iter().zip(&prefixes) {
            if !prefix.is_empty() && !self.records.iter().any(|r| under(&r.path, prefix)) {
                return Err(ScanError::PathNotFound(raw.clone()));
            }
        }

        let mut out: Vec<FileRecord> = self
            .records
            .iter()
            .filter(|r| prefixes.iter().any(|p| under(&r.path, p)))
            .filter(|r| !excluded(&r.path, &options.excluded))
            .cloned()
            .collect();
        sort_records(&mut out);
        debug!("memory source selected {} of {} records", out.len(), self.records.len());
        Ok(out)
    }
}
