//! Property-based tests for aggregation invariants.

use proptest::prelude::*;
use tally_model::{create_export_data, create_lang_report, create_module_report};
use tally_settings::{ChildrenMode, ExportSettings, LangSettings, ModuleSettings};
use tally_types::{Counts, FileRecord};

fn arb_record() -> impl Strategy<Value = FileRecord> {
    (
        prop::collection::vec("[a-c]{1,2}", 0..4),
        "[a-e]\\.(rs|py|md)",
        prop::sample::select(vec!["Rust", "Python", "Markdown", "TOML"]),
        0usize..500,
        0usize..100,
        0usize..100,
        0usize..10_000,
        any::<bool>(),
    )
        .prop_map(|(dirs, file, lang, code, comments, blanks, bytes, child)| {
            let mut parts = dirs;
            parts.push(file);
            let rec = FileRecord::new(parts.join("/"), lang, code, comments, blanks)
                .with_size(bytes, bytes / 4);
            if child { rec.child() } else { rec }
        })
}

fn arb_records() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

fn arb_children() -> impl Strategy<Value = ChildrenMode> {
    prop::sample::select(vec![ChildrenMode::Collapse, ChildrenMode::Separate])
}

proptest! {
    #[test]
    fn lang_totals_are_conserved(
        records in arb_records(),
        top in proptest::option::of(1usize..5),
        children in arb_children(),
    ) {
        let report = create_lang_report(&records, &LangSettings { top, files: false, children });
        let summed: Counts = report.rows.iter().map(|r| r.counts()).sum();
        prop_assert_eq!(summed, report.total);
    }

    #[test]
    fn module_totals_are_conserved(
        records in arb_records(),
        top in proptest::option::of(1usize..5),
        depth in 1usize..4,
        children in arb_children(),
    ) {
        let settings = ModuleSettings { top, module_roots: vec![], module_depth: depth, children };
        let report = create_module_report(&records, &settings);
        let summed: Counts = report.rows.iter().map(|r| r.counts()).sum();
        prop_assert_eq!(summed, report.total);
    }

    #[test]
    fn top_bounds_row_count(records in arb_records(), k in 1usize..5) {
        let uncapped = create_lang_report(&records, &LangSettings::default());
        let capped = create_lang_report(&records, &LangSettings { top: Some(k), ..Default::default() });
        prop_assert!(capped.rows.len() <= k + 1);
        if uncapped.rows.len() > k {
            prop_assert_eq!(capped.rows.len(), k + 1);
            prop_assert_eq!(capped.rows[k].language.as_str(), "Other");
        } else {
            prop_assert_eq!(capped.rows, uncapped.rows);
        }
    }

    #[test]
    fn export_respects_filters(
        records in arb_records(),
        min_code in 0usize..300,
        max_rows in proptest::option::of(1usize..10),
    ) {
        let settings = ExportSettings { min_code, max_rows, ..Default::default() };
        let data = create_export_data(&records, &settings);
        prop_assert!(data.rows.iter().all(|r| r.code >= min_code));
        if let Some(max) = max_rows {
            prop_assert!(data.rows.len() <= max);
        }
        let summed: Counts = data.rows.iter().map(|r| r.counts()).sum();
        prop_assert_eq!(summed, data.total);
    }

    #[test]
    fn output_ignores_record_order(records in arb_records(), children in arb_children()) {
        let mut reversed = records.clone();
        reversed.reverse();

        let lang = LangSettings { children, ..Default::default() };
        prop_assert_eq!(create_lang_report(&records, &lang), create_lang_report(&reversed, &lang));

        let module = ModuleSettings { children, ..Default::default() };
        prop_assert_eq!(create_module_report(&records, &module), create_module_report(&reversed, &module));

        let export = ExportSettings::default();
        prop_assert_eq!(create_export_data(&records, &export), create_export_data(&reversed, &export));
    }

    #[test]
    fn deeper_modules_never_reduce_rows(records in arb_records(), depth in 1usize..4) {
        let shallow = create_module_report(&records, &ModuleSettings { module_depth: depth, ..Default::default() });
        let deep = create_module_report(&records, &ModuleSettings { module_depth: depth + 1, ..Default::default() });
        prop_assert!(deep.rows.len() >= shallow.rows.len());
        prop_assert_eq!(deep.total, shallow.total);
    }
}
