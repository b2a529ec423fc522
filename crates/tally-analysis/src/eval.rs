use std::collections::BTreeMap;

use tally_math::{gini_coefficient, max_share, percentile, ratio, round_f64};
use tally_types::{CountField, Counts, DerivedMetrics, MetricValue};

use crate::{AnalysisError, MetricExpr, Preset};

fn sorted_column(rows: &[Counts], field: CountField) -> Vec<usize> {
    let mut values: Vec<usize> = rows.iter().map(|r| r.get(field)).collect();
    values.sort_unstable();
    values
}

fn sum_fields(total: &Counts, fields: &[CountField]) -> usize {
    fields.iter().map(|f| total.get(*f)).sum()
}

/// Evaluate every metric of `preset` over aggregated rows.
///
/// The rows' sum is the total, so callers pass exactly the rows of the
/// receipt. Metrics are computed in definition order.
pub fn evaluate(preset: &Preset, rows: &[Counts]) -> Result<DerivedMetrics, AnalysisError> {
    preset.validate()?;

    let total: Counts = rows.iter().sum();
    let mut metrics: BTreeMap<String, MetricValue> = BTreeMap::new();

    for def in &preset.metrics {
        let value = match &def.expr {
            MetricExpr::Sum { field } => MetricValue::Integer(total.get(*field) as u64),
            MetricExpr::Count => MetricValue::Integer(rows.len() as u64),
            MetricExpr::Ratio {
                numerator,
                denominator,
                decimals,
            } => MetricValue::Number(ratio(
                sum_fields(&total, numerator),
                sum_fields(&total, denominator),
                *decimals,
            )),
            MetricExpr::MaxShare { field } => {
                let values: Vec<usize> = rows.iter().map(|r| r.get(*field)).collect();
                MetricValue::Number(max_share(&values))
            }
            MetricExpr::Gini { field } => {
                MetricValue::Number(gini_coefficient(&sorted_column(rows, *field)))
            }
            MetricExpr::Percentile { field, pct } => MetricValue::Number(round_f64(
                percentile(&sorted_column(rows, *field), *pct),
                tally_math::DEFAULT_DECIMALS,
            )),
            MetricExpr::Flag { metric, op, value } => {
                let lhs = metrics
                    .get(metric)
                    .and_then(MetricValue::as_f64)
                    .ok_or_else(|| {
                        AnalysisError::invalid(
                            &preset.name,
                            format!("flag '{}' references unknown metric '{metric}'", def.name),
                        )
                    })?;
                MetricValue::Bool(op.apply(lhs, *value))
            }
        };
        metrics.insert(def.name.clone(), value);
    }

    Ok(DerivedMetrics {
        preset: preset.name.clone(),
        metrics,
    })
}
