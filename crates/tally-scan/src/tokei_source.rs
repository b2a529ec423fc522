use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use tokei::{CodeStats, Config, Languages};

use tally_module_key::normalize_path;
use tally_types::{ConfigMode, FileRecord, ScanOptions};

use crate::{RecordSource, ScanError, sort_records};

/// Token estimate divisor: one token per this many bytes.
pub const CHARS_PER_TOKEN: usize = 4;

/// Record source that walks the filesystem with `tokei`.
///
/// When a single directory is scanned, record paths are relative to it.
/// Otherwise they are the walked paths, normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokeiSource;

impl TokeiSource {
    pub fn new() -> Self {
        Self
    }
}

fn tokei_config(args: &ScanOptions) -> Config {
    let mut cfg = match args.config {
        ConfigMode::Auto => Config::from_config_files(),
        ConfigMode::None => Config::default(),
    };

    // Only override config file settings when explicitly asked for.
    if args.hidden {
        cfg.hidden = Some(true);
    }
    if args.no_ignore {
        cfg.no_ignore = Some(true);
        cfg.no_ignore_dot = Some(true);
        cfg.no_ignore_parent = Some(true);
        cfg.no_ignore_vcs = Some(true);
    }
    if args.no_ignore_dot {
        cfg.no_ignore_dot = Some(true);
    }
    if args.no_ignore_parent {
        cfg.no_ignore_parent = Some(true);
    }
    if args.no_ignore_vcs {
        cfg.no_ignore_vcs = Some(true);
    }
    if args.treat_doc_strings_as_comments {
        cfg.treat_doc_strings_as_comments = Some(true);
    }
    cfg
}

fn scan(paths: &[PathBuf], args: &ScanOptions) -> Languages {
    let cfg = tokei_config(args);
    let ignores: Vec<&str> = args.excluded.iter().map(|s| s.as_str()).collect();

    let mut languages = Languages::new();
    languages.get_statistics(paths, &ignores, &cfg);
    languages
}

fn file_bytes(path: &Path) -> Result<usize> {
    let meta = fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    Ok(usize::try_from(meta.len()).unwrap_or(usize::MAX))
}

/// Checks that a requested scan path can be walked.
///
/// tokei skips unreadable entries silently, so a root that cannot be listed
/// would otherwise scan as empty.
fn check_path(path: &Path) -> Result<(), ScanError> {
    let meta = match fs::metadata(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::PathNotFound(path.display().to_string()));
        }
        other => other.with_context(|| format!("reading metadata for {}", path.display())),
    };
    meta.and_then(|meta| {
        if meta.is_dir() {
            fs::read_dir(path).with_context(|| format!("listing {}", path.display()))?;
        }
        Ok(())
    })
    .map_err(|err| ScanError::Scan(format!("{err:#}")))
}

fn record_path(name: &Path, strip: Option<&Path>) -> String {
    let rel = strip
        .and_then(|root| name.strip_prefix(root).ok())
        .unwrap_or(name);
    normalize_path(&rel.to_string_lossy())
}

fn own_counts(stats: &CodeStats) -> (usize, usize, usize) {
    (stats.code, stats.comments, stats.blanks)
}

fn to_records(languages: &Languages, strip: Option<&Path>) -> Vec<FileRecord> {
    let mut records = Vec::new();

    for (lang_type, lang) in languages.iter() {
        for report in &lang.reports {
            let path = record_path(&report.name, strip);
            let (code, comments, blanks) = own_counts(&report.stats);
            let bytes = match file_bytes(&report.name) {
                Ok(b) => b,
                Err(err) => {
                    warn!("{err:#}; counting 0 bytes");
                    0
                }
            };
            records.push(
                FileRecord::new(path, lang_type.name(), code, comments, blanks)
                    .with_size(bytes, bytes / CHARS_PER_TOKEN),
            );
        }

        for (child_type, reports) in &lang.children {
            for report in reports {
                let path = record_path(&report.name, strip);
                let st = report.stats.summarise();
                records.push(
                    FileRecord::new(path, child_type.name(), st.code, st.comments, st.blanks)
                        .child(),
                );
            }
        }
    }

    records
}

impl RecordSource for TokeiSource {
    fn collect(
        &self,
        paths: &[String],
        options: &ScanOptions,
    ) -> Result<Vec<FileRecord>, ScanError> {
        let paths: Vec<PathBuf> = if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths.iter().map(PathBuf::from).collect()
        };

        for path in &paths {
            check_path(path)?;
        }

        let strip = match paths.as_slice() {
            [single] if single.is_dir() => Some(single.as_path()),
            _ => None,
        };

        let languages = scan(&paths, options);
        let mut records = to_records(&languages, strip);
        sort_records(&mut records);
        debug!(
            "tokei collected {} records from {} path(s)",
            records.len(),
            paths.len()
        );
        Ok(records)
    }
}
