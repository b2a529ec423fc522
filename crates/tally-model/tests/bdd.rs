//! BDD-style scenarios for tally-model aggregation logic.
//!
//! Each test reads as a Given/When/Then scenario exercising:
//! - Top-N folding into `Other`
//! - Children handling (Collapse vs Separate)
//! - Module keys with and without roots
//! - Export filters

use tally_model::{create_export_data, create_lang_report, create_module_report};
use tally_settings::{ChildrenMode, ExportSettings, LangSettings, ModuleSettings};
use tally_types::FileRecord;

fn two_language_tree() -> Vec<FileRecord> {
    let mut records = Vec::new();
    for i in 0..6 {
        records.push(FileRecord::new(format!("a/file{i}.a"), "LanguageA", 10, 0, 0));
    }
    for i in 0..4 {
        records.push(FileRecord::new(format!("b/file{i}.b"), "LanguageB", 10, 0, 0));
    }
    records
}

// ========================
// Scenario: top-N folding
// ========================

#[test]
fn scenario_two_languages_sum_to_total() {
    // Given 6 LanguageA files (60 code) and 4 LanguageB files (40 code)
    let records = two_language_tree();

    // When I aggregate by language without a cap
    let report = create_lang_report(&records, &LangSettings::default());

    // Then there are two rows summing to 100 code lines
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].language, "LanguageA");
    assert_eq!(report.rows[0].code, 60);
    assert_eq!(report.rows[0].files, 6);
    assert_eq!(report.rows[1].code, 40);
    assert_eq!(report.total.code, 100);
}

#[test]
fn scenario_top_one_folds_rest_into_other() {
    // Given the same tree
    let records = two_language_tree();

    // When I ask for the top language only
    let settings = LangSettings {
        top: Some(1),
        ..Default::default()
    };
    let report = create_lang_report(&records, &settings);

    // Then LanguageA is kept and LanguageB becomes "Other"
    let names: Vec<&str> = report.rows.iter().map(|r| r.language.as_str()).collect();
    assert_eq!(names, vec!["LanguageA", "Other"]);
    assert_eq!(report.rows[1].code, 40);
    assert_eq!(report.rows[1].files, 4);
    assert_eq!(report.total.code, 100);
}

#[test]
fn scenario_ties_break_by_name() {
    // Given two languages with equal code
    let records = vec![
        FileRecord::new("z.zz", "Zed", 5, 0, 0),
        FileRecord::new("a.aa", "Alpha", 5, 0, 0),
    ];

    // When aggregated
    let report = create_lang_report(&records, &LangSettings::default());

    // Then the alphabetically first name comes first
    assert_eq!(report.rows[0].language, "Alpha");
}

#[test]
fn scenario_zero_code_languages_are_kept() {
    // Given a language with only comments
    let records = vec![
        FileRecord::new("a.rs", "Rust", 5, 0, 0),
        FileRecord::new("notes.txt", "Plain Text", 0, 3, 2),
    ];

    // When aggregated
    let report = create_lang_report(&records, &LangSettings::default());

    // Then its lines still show up in a row
    let text = report.rows.iter().find(|r| r.language == "Plain Text").unwrap();
    assert_eq!(text.lines, 5);
    assert_eq!(report.total.lines, 10);
}

// ========================
// Scenario: embedded languages
// ========================

#[test]
fn scenario_embedded_code_counts_once() {
    // Given a Markdown file with an embedded Rust block
    let records = vec![
        FileRecord::new("README.md", "Markdown", 0, 10, 2).with_size(400, 100),
        FileRecord::new("README.md", "Rust", 4, 1, 0).child(),
    ];

    // When aggregated in both modes
    let collapse = create_lang_report(&records, &LangSettings::default());
    let separate = create_lang_report(
        &records,
        &LangSettings {
            children: ChildrenMode::Separate,
            ..Default::default()
        },
    );

    // Then totals agree and bytes are never doubled
    assert_eq!(collapse.total, separate.total);
    assert_eq!(collapse.total.bytes, 400);
    assert_eq!(collapse.total.files, 1);
    assert_eq!(collapse.rows.len(), 1);
    assert_eq!(separate.rows.len(), 2);
}

// ========================
// Scenario: module grouping
// ========================

#[test]
fn scenario_module_roots_send_strays_to_other() {
    // Given a workspace layout
    let records = vec![
        FileRecord::new("crates/a/src/lib.rs", "Rust", 30, 0, 0),
        FileRecord::new("crates/b/src/lib.rs", "Rust", 20, 0, 0),
        FileRecord::new("scripts/build.sh", "Shell", 5, 0, 0),
        FileRecord::new("Cargo.toml", "TOML", 3, 0, 0),
    ];

    // When grouped with `crates` as the only root
    let settings = ModuleSettings {
        module_roots: vec!["crates".to_string()],
        ..Default::default()
    };
    let report = create_module_report(&records, &settings);

    // Then crate modules are split and everything else is "(other)"
    let keys: Vec<(&str, usize)> = report
        .rows
        .iter()
        .map(|r| (r.module.as_str(), r.code))
        .collect();
    assert_eq!(keys, vec![("crates/a", 30), ("crates/b", 20), ("(other)", 8)]);
}

#[test]
fn scenario_module_top_folds_like_languages() {
    // Given three modules
    let records = vec![
        FileRecord::new("a/x.rs", "Rust", 30, 0, 0),
        FileRecord::new("b/x.rs", "Rust", 20, 0, 0),
        FileRecord::new("c/x.rs", "Rust", 10, 0, 0),
    ];

    // When capped at two
    let settings = ModuleSettings {
        top: Some(2),
        ..Default::default()
    };
    let report = create_module_report(&records, &settings);

    // Then the third is folded
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[2].module, "Other");
    assert_eq!(report.rows[2].code, 10);
}

// ========================
// Scenario: export
// ========================

#[test]
fn scenario_export_respects_bounds() {
    // Given ten files
    let records = two_language_tree();

    // When exporting with a floor and a cap
    let settings = ExportSettings {
        min_code: 10,
        max_rows: Some(3),
        ..Default::default()
    };
    let data = create_export_data(&records, &settings);

    // Then at most three rows come back, ordered by path on ties
    let paths: Vec<&str> = data.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["a/file0.a", "a/file1.a", "a/file2.a"]);
    assert_eq!(data.total.code, 30);
    assert_eq!(data.matched, 10);
}

#[test]
fn scenario_export_module_column_uses_depth() {
    // Given a nested file
    let records = vec![FileRecord::new("pkg/core/src/lib.rs", "Rust", 1, 0, 0)];

    // When exported with depth 2
    let data = create_export_data(&records, &ExportSettings::default());

    // Then the module column carries two directory segments
    assert_eq!(data.rows[0].module, "pkg/core");
}
