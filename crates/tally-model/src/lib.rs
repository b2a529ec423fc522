//! # tally-model
//!
//! **Tier 2 (Aggregation)**
//!
//! Pure functions that turn a slice of [`FileRecord`]s into language rows,
//! module rows and file-level export rows. Nothing here touches the
//! filesystem, and the output never depends on record order.

use std::collections::{BTreeMap, BTreeSet};

use tally_module_key::module_key;
use tally_settings::{ChildrenMode, ExportSettings, LangSettings, ModuleSettings};
use tally_types::{
    Counts, ExportData, ExportRow, FileKind, FileRecord, LangReport, LanguageRow, ModuleReport,
    ModuleRow, OTHER_ROW,
};

pub use tally_types::avg;

/// Suffix for embedded-language rows in separate mode.
pub const EMBEDDED_SUFFIX: &str = " (embedded)";

/// Shared behaviour of aggregated rows, so sorting and folding are written once.
trait GroupRow: Sized {
    fn key(&self) -> &str;
    fn code(&self) -> usize;
    fn counts(&self) -> Counts;
    fn build(key: String, counts: Counts) -> Self;
}

impl GroupRow for LanguageRow {
    fn key(&self) -> &str {
        &self.language
    }
    fn code(&self) -> usize {
        self.code
    }
    fn counts(&self) -> Counts {
        LanguageRow::counts(self)
    }
    fn build(key: String, counts: Counts) -> Self {
        LanguageRow::from_counts(key, counts)
    }
}

impl GroupRow for ModuleRow {
    fn key(&self) -> &str {
        &self.module
    }
    fn code(&self) -> usize {
        self.code
    }
    fn counts(&self) -> Counts {
        ModuleRow::counts(self)
    }
    fn build(key: String, counts: Counts) -> Self {
        ModuleRow::from_counts(key, counts)
    }
}

/// Per-group accumulator: summed counts plus the distinct parent paths seen.
#[derive(Default)]
struct Agg<'a> {
    counts: Counts,
    files: BTreeSet<&'a str>,
}

impl<'a> Agg<'a> {
    fn add(&mut self, record: &'a FileRecord) {
        self.counts.add_record(record);
        if record.kind == FileKind::Parent {
            self.files.insert(record.path.as_str());
        }
    }

    fn finish(mut self) -> Counts {
        self.counts.files = self.files.len();
        self.counts
    }
}

/// Sort, total, then fold everything past `top` into one `Other` row.
fn finish_rows<R: GroupRow>(groups: BTreeMap<String, Agg<'_>>, top: Option<usize>) -> (Vec<R>, Counts) {
    let mut rows: Vec<R> = groups
        .into_iter()
        .map(|(key, agg)| R::build(key, agg.finish()))
        .collect();

    // Sort descending by code, then by name for determinism.
    rows.sort_by(|a, b| b.code().cmp(&a.code()).then_with(|| a.key().cmp(b.key())));

    // Totals are computed *before* folding to top-N.
    let total: Counts = rows.iter().map(|r| r.counts()).sum();

    if let Some(top) = top
        && top > 0
        && rows.len() > top
    {
        let other = fold_other(&rows[top..]);
        rows.truncate(top);
        rows.push(other);
    }

    (rows, total)
}

fn fold_other<R: GroupRow>(rows: &[R]) -> R {
    let counts: Counts = rows.iter().map(|r| r.counts()).sum();
    R::build(OTHER_ROW.to_string(), counts)
}

/// Language of the parent record for every path that has one.
///
/// With several parents on one path the alphabetically first language wins.
fn parent_languages(records: &[FileRecord]) -> BTreeMap<&str, &str> {
    let mut out: BTreeMap<&str, &str> = BTreeMap::new();
    for r in records.iter().filter(|r| r.kind == FileKind::Parent) {
        out.entry(r.path.as_str())
            .and_modify(|lang| {
                if r.language.as_str() < *lang {
                    *lang = r.language.as_str();
                }
            })
            .or_insert(r.language.as_str());
    }
    out
}

pub fn create_lang_report(records: &[FileRecord], settings: &LangSettings) -> LangReport {
    let parents = parent_languages(records);
    let mut groups: BTreeMap<String, Agg<'_>> = BTreeMap::new();

    for r in records {
        let key = match (r.kind, settings.children) {
            (FileKind::Parent, _) => r.language.clone(),
            (FileKind::Child, ChildrenMode::Collapse) => parents
                .get(r.path.as_str())
                .map_or_else(|| r.language.clone(), |lang| (*lang).to_string()),
            (FileKind::Child, ChildrenMode::Separate) => format!("{}{EMBEDDED_SUFFIX}", r.language),
        };
        groups.entry(key).or_default().add(r);
    }

    let (rows, total) = finish_rows(groups, settings.top);
    LangReport { rows, total }
}

pub fn create_module_report(records: &[FileRecord], settings: &ModuleSettings) -> ModuleReport {
    let depth = match settings.children {
        ChildrenMode::Collapse => settings.module_depth,
        ChildrenMode::Separate => usize::MAX,
    };

    let mut groups: BTreeMap<String, Agg<'_>> = BTreeMap::new();
    for r in records {
        let key = module_key(&r.path, &settings.module_roots, depth);
        groups.entry(key).or_default().add(r);
    }

    let (rows, total) = finish_rows(groups, settings.top);
    ModuleReport { rows, total }
}

/// One row per file with embedded segments folded into their parent, in
/// canonical export order and without filters.
pub fn file_rows(records: &[FileRecord], module_roots: &[String], module_depth: usize) -> Vec<ExportRow> {
    let parents = parent_languages(records);

    let mut by_file: BTreeMap<(&str, &str), Counts> = BTreeMap::new();
    for r in records {
        let lang = match r.kind {
            FileKind::Parent => r.language.as_str(),
            FileKind::Child => parents
                .get(r.path.as_str())
                .copied()
                .unwrap_or(r.language.as_str()),
        };
        by_file.entry((r.path.as_str(), lang)).or_default().add_record(r);
    }

    let mut rows: Vec<ExportRow> = by_file
        .into_iter()
        .map(|((path, language), c)| ExportRow {
            path: path.to_string(),
            module: module_key(path, module_roots, module_depth),
            language: language.to_string(),
            code: c.code,
            comments: c.comments,
            blanks: c.blanks,
            lines: c.lines,
            bytes: c.bytes,
            tokens: c.tokens,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.code
            .cmp(&a.code)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.language.cmp(&b.language))
    });
    rows
}

pub fn create_export_data(records: &[FileRecord], settings: &ExportSettings) -> ExportData {
    let mut rows = file_rows(records, &settings.module_roots, settings.module_depth);
    let matched = rows.len();

    if settings.min_code > 0 {
        rows.retain(|r| r.code >= settings.min_code);
    }
    if let Some(max_rows) = settings.max_rows
        && rows.len() > max_rows
    {
        rows.truncate(max_rows);
    }

    let total: Counts = rows.iter().map(ExportRow::counts).sum();
    ExportData {
        rows,
        total,
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str, lang: &str, code: usize) -> FileRecord {
        FileRecord::new(path, lang, code, 1, 1).with_size(code * 10, code * 10 / 4)
    }

    fn sample() -> Vec<FileRecord> {
        vec![
            rec("src/lib.rs", "Rust", 50),
            rec("src/util/mod.rs", "Rust", 30),
            rec("tests/t.rs", "Rust", 20),
            rec("README.md", "Markdown", 0),
            FileRecord::new("README.md", "Rust", 6, 0, 0).child(),
            rec("web/app.ts", "TypeScript", 40),
        ]
    }

    #[test]
    fn lang_collapse_attributes_children_to_parent() {
        let report = create_lang_report(&sample(), &LangSettings::default());
        let md = report.rows.iter().find(|r| r.language == "Markdown").unwrap();
        assert_eq!(md.code, 6);
        assert_eq!(md.files, 1);
        assert!(report.rows.iter().all(|r| !r.language.ends_with(EMBEDDED_SUFFIX)));
    }

    #[test]
    fn lang_separate_emits_embedded_rows_without_files() {
        let settings = LangSettings {
            children: ChildrenMode::Separate,
            ..Default::default()
        };
        let report = create_lang_report(&sample(), &settings);
        let emb = report
            .rows
            .iter()
            .find(|r| r.language == "Rust (embedded)")
            .unwrap();
        assert_eq!(emb.code, 6);
        assert_eq!(emb.files, 0);
        assert_eq!(emb.bytes, 0);
    }

    #[test]
    fn lang_rows_sorted_by_code_then_name() {
        let report = create_lang_report(&sample(), &LangSettings::default());
        let names: Vec<&str> = report.rows.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "TypeScript", "Markdown"]);
        assert_eq!(report.total.code, 146);
        assert_eq!(report.total.files, 5);
    }

    #[test]
    fn lang_top_folds_into_other() {
        let settings = LangSettings {
            top: Some(1),
            ..Default::default()
        };
        let report = create_lang_report(&sample(), &settings);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].language, "Other");
        assert_eq!(report.rows[1].code, 46);
        assert_eq!(report.rows[1].files, 2);
    }

    #[test]
    fn lang_top_equal_to_rows_has_no_other() {
        let settings = LangSettings {
            top: Some(3),
            ..Default::default()
        };
        let report = create_lang_report(&sample(), &settings);
        assert!(report.rows.iter().all(|r| r.language != "Other"));
    }

    #[test]
    fn module_collapse_vs_separate() {
        let collapse = create_module_report(
            &sample(),
            &ModuleSettings {
                module_depth: 1,
                ..Default::default()
            },
        );
        let keys: Vec<&str> = collapse.rows.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(keys, vec!["src", "web", "tests", "(root)"]);

        let separate = create_module_report(
            &sample(),
            &ModuleSettings {
                module_depth: 1,
                children: ChildrenMode::Separate,
                ..Default::default()
            },
        );
        assert!(separate.rows.iter().any(|r| r.module == "src/util"));
        assert_eq!(separate.total, collapse.total);
    }

    #[test]
    fn export_folds_children_and_filters() {
        let data = create_export_data(&sample(), &ExportSettings::default());
        assert_eq!(data.rows.len(), 5);
        let readme = data.rows.iter().find(|r| r.path == "README.md").unwrap();
        assert_eq!(readme.language, "Markdown");
        assert_eq!(readme.code, 6);

        let filtered = create_export_data(
            &sample(),
            &ExportSettings {
                min_code: 30,
                max_rows: Some(2),
                ..Default::default()
            },
        );
        let paths: Vec<&str> = filtered.rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/lib.rs", "web/app.ts"]);
        assert_eq!(filtered.total.code, 90);
        assert_eq!(filtered.total.files, 2);
        assert_eq!(filtered.matched, 5);
    }

    #[test]
    fn empty_input_yields_empty_reports() {
        let report = create_lang_report(&[], &LangSettings::default());
        assert!(report.rows.is_empty());
        assert_eq!(report.total, Counts::default());
        let data = create_export_data(&[], &ExportSettings::default());
        assert!(data.rows.is_empty());
    }
}
