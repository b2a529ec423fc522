//! Property-based tests for the count arithmetic in tally-types.

use proptest::prelude::*;
use tally_types::{CountField, Counts, LanguageRow, ModuleRow};

fn arb_counts(max: usize) -> impl Strategy<Value = Counts> {
    (
        0..=max,
        0..=max,
        0..=max,
        0..=max,
        0..=max,
        0..=max,
        0..=max,
    )
        .prop_map(|(files, code, comments, blanks, lines, bytes, tokens)| Counts {
            files,
            code,
            comments,
            blanks,
            lines,
            bytes,
            tokens,
        })
}

/// Counts with a single field set to `value`.
fn only(field: CountField, value: usize) -> Counts {
    let mut c = Counts::default();
    match field {
        CountField::Files => c.files = value,
        CountField::Code => c.code = value,
        CountField::Comments => c.comments = value,
        CountField::Blanks => c.blanks = value,
        CountField::Lines => c.lines = value,
        CountField::Bytes => c.bytes = value,
        CountField::Tokens => c.tokens = value,
    }
    c
}

// ============================================================================
// Addition
// ============================================================================

proptest! {
    #[test]
    fn checked_add_agrees_with_merge(a in arb_counts(1_000_000), b in arb_counts(1_000_000)) {
        let mut merged = a;
        merged.merge(&b);
        prop_assert_eq!(a.checked_add(&b), Some(merged));
    }

    #[test]
    fn checked_add_reports_overflow(idx in 0usize..7, extra in 1usize..1_000) {
        let field = CountField::ALL[idx];
        let full = only(field, usize::MAX);
        prop_assert_eq!(full.checked_add(&only(field, extra)), None);
    }

    #[test]
    fn max_field_bounds_every_field(c in arb_counts(usize::MAX)) {
        let max = c.max_field();
        for field in CountField::ALL {
            prop_assert!(c.get(field) <= max);
        }
        prop_assert!(CountField::ALL.iter().any(|f| c.get(*f) == max));
    }

    #[test]
    fn sum_matches_fieldwise_addition(rows in prop::collection::vec(arb_counts(10_000), 0..20)) {
        let total: Counts = rows.iter().copied().sum();
        prop_assert_eq!(total.code, rows.iter().map(|c| c.code).sum::<usize>());
        prop_assert_eq!(total.files, rows.iter().map(|c| c.files).sum::<usize>());
    }
}

// ============================================================================
// Rows
// ============================================================================

proptest! {
    #[test]
    fn rows_keep_their_counts(c in arb_counts(1_000_000)) {
        prop_assert_eq!(LanguageRow::from_counts("Rust", c).counts(), c);
        prop_assert_eq!(ModuleRow::from_counts("src", c).counts(), c);
    }

    #[test]
    fn avg_lines_is_zero_without_files(c in arb_counts(1_000_000)) {
        let c = Counts { files: 0, ..c };
        prop_assert_eq!(LanguageRow::from_counts("Rust", c).avg_lines, 0);
    }
}
