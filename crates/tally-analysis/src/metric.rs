use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tally_types::CountField;

use crate::AnalysisError;

pub use tally_math::DEFAULT_DECIMALS;

/// Upper bound on ratio precision.
pub const MAX_DECIMALS: u32 = 8;

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

/// How a metric is computed from the aggregated rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricExpr {
    /// Total of one field.
    Sum { field: CountField },
    /// Number of rows.
    Count,
    /// `sum(numerator fields) / sum(denominator fields)`, zero when the
    /// denominator is zero.
    Ratio {
        numerator: Vec<CountField>,
        denominator: Vec<CountField>,
        #[serde(default = "default_decimals")]
        decimals: u32,
    },
    /// Largest row's share of the field total.
    MaxShare { field: CountField },
    /// Gini coefficient of the field across rows.
    Gini { field: CountField },
    /// Nearest-rank percentile of the field across rows.
    Percentile { field: CountField, pct: f64 },
    /// Threshold check against an earlier numeric metric.
    Flag {
        metric: String,
        op: CompareOp,
        value: f64,
    },
}

impl MetricExpr {
    pub fn is_flag(&self) -> bool {
        matches!(self, MetricExpr::Flag { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDef {
    pub name: String,
    #[serde(flatten)]
    pub expr: MetricExpr,
}

impl MetricDef {
    pub fn new(name: impl Into<String>, expr: MetricExpr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// A named, declarative bundle of derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub metrics: Vec<MetricDef>,
}

impl Preset {
    /// Check that the preset can be evaluated on any input.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(AnalysisError::invalid(name, "name must not be empty"));
        }
        if self.metrics.is_empty() {
            return Err(AnalysisError::invalid(name, "no metrics defined"));
        }

        // Names of numeric metrics seen so far; flags may only look backwards.
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut numeric: BTreeSet<&str> = BTreeSet::new();

        for def in &self.metrics {
            let metric = def.name.as_str();
            if metric.trim().is_empty() {
                return Err(AnalysisError::invalid(name, "metric name must not be empty"));
            }
            if !seen.insert(metric) {
                return Err(AnalysisError::invalid(
                    name,
                    format!("duplicate metric '{metric}'"),
                ));
            }

            match &def.expr {
                MetricExpr::Ratio {
                    numerator,
                    denominator,
                    decimals,
                } => {
                    if numerator.is_empty() || denominator.is_empty() {
                        return Err(AnalysisError::invalid(
                            name,
                            format!("ratio '{metric}' needs numerator and denominator fields"),
                        ));
                    }
                    if *decimals > MAX_DECIMALS {
                        return Err(AnalysisError::invalid(
                            name,
                            format!("ratio '{metric}' asks for more than {MAX_DECIMALS} decimals"),
                        ));
                    }
                }
                MetricExpr::Percentile { pct, .. } => {
                    if !(0.0..=1.0).contains(pct) {
                        return Err(AnalysisError::invalid(
                            name,
                            format!("percentile '{metric}' must be within [0, 1]"),
                        ));
                    }
                }
                MetricExpr::Flag {
                    metric: target,
                    value,
                    ..
                } => {
                    if !value.is_finite() {
                        return Err(AnalysisError::invalid(
                            name,
                            format!("flag '{metric}' threshold must be finite"),
                        ));
                    }
                    if !numeric.contains(target.as_str()) {
                        return Err(AnalysisError::invalid(
                            name,
                            format!(
                                "flag '{metric}' must reference an earlier numeric metric, got '{target}'"
                            ),
                        ));
                    }
                }
                MetricExpr::Sum { .. }
                | MetricExpr::Count
                | MetricExpr::MaxShare { .. }
                | MetricExpr::Gini { .. } => {}
            }

            if !def.expr.is_flag() {
                numeric.insert(metric);
            }
        }
        Ok(())
    }
}
