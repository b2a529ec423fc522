//! Property-based tests for preset evaluation over arbitrary rows.

use proptest::prelude::*;
use tally_analysis::{MetricExpr, PresetRegistry, evaluate};
use tally_types::{Counts, MetricValue};

fn arb_row() -> impl Strategy<Value = Counts> {
    (0usize..500, 0usize..50_000, 0usize..10_000, 0usize..10_000).prop_map(
        |(files, code, comments, blanks)| Counts {
            files,
            code,
            comments,
            blanks,
            lines: code + comments + blanks,
            bytes: code * 40,
            tokens: code * 10,
        },
    )
}

fn arb_rows() -> impl Strategy<Value = Vec<Counts>> {
    prop::collection::vec(arb_row(), 0..12)
}

proptest! {
    #[test]
    fn builtin_presets_yield_one_value_per_metric(rows in arb_rows()) {
        let registry = PresetRegistry::builtin();
        for name in registry.names() {
            let preset = registry.get(name).unwrap();
            let derived = evaluate(preset, &rows).unwrap();

            prop_assert_eq!(&derived.preset, &preset.name);
            prop_assert_eq!(derived.metrics.len(), preset.metrics.len());
            for def in &preset.metrics {
                let value = &derived.metrics[&def.name];
                prop_assert_eq!(def.expr.is_flag(), matches!(value, MetricValue::Bool(_)));
                if let MetricValue::Number(n) = value {
                    prop_assert!(n.is_finite(), "{}.{} = {n}", preset.name, def.name);
                }
            }
        }
    }

    #[test]
    fn shares_stay_within_unit_interval(rows in arb_rows()) {
        let registry = PresetRegistry::builtin();
        for name in registry.names() {
            let preset = registry.get(name).unwrap();
            let derived = evaluate(preset, &rows).unwrap();
            for def in &preset.metrics {
                if matches!(def.expr, MetricExpr::MaxShare { .. } | MetricExpr::Gini { .. }) {
                    let n = derived.metrics[&def.name].as_f64().unwrap();
                    prop_assert!((0.0..=1.0).contains(&n), "{}.{} = {n}", preset.name, def.name);
                }
            }
        }
    }

    #[test]
    fn row_order_does_not_matter(rows in arb_rows()) {
        let mut reversed = rows.clone();
        reversed.reverse();
        let registry = PresetRegistry::builtin();
        for name in registry.names() {
            let preset = registry.get(name).unwrap();
            prop_assert_eq!(
                evaluate(preset, &rows).unwrap(),
                evaluate(preset, &reversed).unwrap()
            );
        }
    }
}
