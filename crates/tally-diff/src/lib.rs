//! # tally-diff
//!
//! **Tier 3 (Comparison)**
//!
//! Outer-joins the rows of two receipts by key and reports per-field deltas
//! and relative changes. Pure: receipts in, rows out.

use std::collections::BTreeMap;

use thiserror::Error;

use tally_math::pct_change;
use tally_types::{Counts, CountsDelta, DiffRow, GroupBy, Mode, PctChange, Receipt};

/// Key of the synthetic row summing both sides.
pub const TOTAL_KEY: &str = "total";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("{0} receipts cannot be diffed")]
    NotDiffable(Mode),

    #[error("cannot compare {from} rows with {to} rows")]
    IncompatibleReceipts { from: GroupBy, to: GroupBy },

    /// A count, or a sum of counts, does not fit a signed 64-bit delta.
    #[error("counts for '{key}' exceed the comparable range")]
    OutOfRange { key: String },
}

/// Counts are compared as `i64`, so every field must fit one.
fn in_range(counts: &Counts) -> bool {
    i64::try_from(counts.max_field()).is_ok()
}

fn checked_sum<'a>(
    key: &str,
    counts: impl IntoIterator<Item = &'a Counts>,
) -> Result<Counts, DiffError> {
    let mut total = Counts::default();
    for c in counts {
        total = total
            .checked_add(c)
            .filter(in_range)
            .ok_or_else(|| DiffError::OutOfRange {
                key: key.to_string(),
            })?;
    }
    Ok(total)
}

/// The comparable content of a receipt: its row kind and keyed counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    pub kind: GroupBy,
    pub rows: Vec<(String, Counts)>,
}

impl RowSet {
    pub fn new(kind: GroupBy, rows: Vec<(String, Counts)>) -> Self {
        Self { kind, rows }
    }

    /// Rows of a `lang`, `module` or `analyze` receipt.
    ///
    /// Fails with [`DiffError::OutOfRange`] when a row holds a count that
    /// cannot be compared.
    pub fn from_receipt(receipt: &Receipt) -> Result<Self, DiffError> {
        let set = Self::rows_of(receipt)?;
        if let Some((key, _)) = set.rows.iter().find(|(_, c)| !in_range(c)) {
            return Err(DiffError::OutOfRange { key: key.clone() });
        }
        Ok(set)
    }

    fn rows_of(receipt: &Receipt) -> Result<Self, DiffError> {
        match receipt {
            Receipt::Lang(r) => Ok(Self::new(
                GroupBy::Lang,
                r.rows
                    .iter()
                    .map(|row| (row.language.clone(), row.counts()))
                    .collect(),
            )),
            Receipt::Module(r) => Ok(Self::new(
                GroupBy::Module,
                r.rows
                    .iter()
                    .map(|row| (row.module.clone(), row.counts()))
                    .collect(),
            )),
            Receipt::Analyze(r) => Ok(Self::new(r.args.group_by, r.rows.keyed_counts())),
            other => Err(DiffError::NotDiffable(other.mode())),
        }
    }

    /// Counts per key; repeated keys are summed.
    fn by_key(&self) -> Result<BTreeMap<&str, Counts>, DiffError> {
        let mut grouped: BTreeMap<&str, Vec<&Counts>> = BTreeMap::new();
        for (key, counts) in &self.rows {
            grouped.entry(key.as_str()).or_default().push(counts);
        }
        grouped
            .into_iter()
            .map(|(key, counts)| Ok((key, checked_sum(key, counts)?)))
            .collect()
    }
}

/// Rows and total produced by [`compute_diff`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub compared: GroupBy,
    pub rows: Vec<DiffRow>,
    pub total: DiffRow,
}

/// `to - from`, saturating at the `i64` bounds.
fn delta(from: usize, to: usize) -> i64 {
    let d = to as i128 - from as i128;
    i64::try_from(d).unwrap_or(if d < 0 { i64::MIN } else { i64::MAX })
}

/// Build the comparison row for one key.
pub fn diff_row(key: impl Into<String>, from: Counts, to: Counts) -> DiffRow {
    DiffRow {
        key: key.into(),
        from,
        to,
        delta: CountsDelta {
            files: delta(from.files, to.files),
            code: delta(from.code, to.code),
            comments: delta(from.comments, to.comments),
            blanks: delta(from.blanks, to.blanks),
            lines: delta(from.lines, to.lines),
            bytes: delta(from.bytes, to.bytes),
            tokens: delta(from.tokens, to.tokens),
        },
        pct_change: PctChange {
            files: pct_change(from.files, to.files),
            code: pct_change(from.code, to.code),
            comments: pct_change(from.comments, to.comments),
            blanks: pct_change(from.blanks, to.blanks),
            lines: pct_change(from.lines, to.lines),
            bytes: pct_change(from.bytes, to.bytes),
            tokens: pct_change(from.tokens, to.tokens),
        },
    }
}

/// Compare two row sets of the same kind.
///
/// Every key present on either side gets a row (missing side is zero),
/// unchanged keys included. Rows are ordered by key.
pub fn compute_diff(from: &RowSet, to: &RowSet) -> Result<DiffReport, DiffError> {
    if from.kind != to.kind {
        return Err(DiffError::IncompatibleReceipts {
            from: from.kind,
            to: to.kind,
        });
    }

    let before = from.by_key()?;
    let after = to.by_key()?;

    let mut keys: Vec<&str> = before.keys().chain(after.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    let rows: Vec<DiffRow> = keys
        .into_iter()
        .map(|key| {
            let f = before.get(key).copied().unwrap_or_default();
            let t = after.get(key).copied().unwrap_or_default();
            diff_row(key, f, t)
        })
        .collect();

    let from_total = checked_sum(TOTAL_KEY, rows.iter().map(|r| &r.from))?;
    let to_total = checked_sum(TOTAL_KEY, rows.iter().map(|r| &r.to))?;

    Ok(DiffReport {
        compared: from.kind,
        rows,
        total: diff_row(TOTAL_KEY, from_total, to_total),
    })
}
