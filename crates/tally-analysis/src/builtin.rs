//! Built-in presets. Thresholds here are defaults; registering a preset with
//! the same name replaces them.

use tally_types::CountField::{self, Blanks, Bytes, Code, Comments, Files, Lines, Tokens};

use crate::{CompareOp, MetricDef, MetricExpr, Preset};

/// Comment density below this is flagged by `health`.
pub const LOW_COMMENT_DENSITY: f64 = 0.05;
/// A single group holding more than this share of code is flagged by `risk`.
pub const CONCENTRATION_SHARE: f64 = 0.5;
/// Average file length above this is flagged by `risk`.
pub const LARGE_FILE_LINES: f64 = 500.0;

fn sum(name: &str, field: CountField) -> MetricDef {
    MetricDef::new(name, MetricExpr::Sum { field })
}

fn ratio(name: &str, numerator: &[CountField], denominator: &[CountField], decimals: u32) -> MetricDef {
    MetricDef::new(
        name,
        MetricExpr::Ratio {
            numerator: numerator.to_vec(),
            denominator: denominator.to_vec(),
            decimals,
        },
    )
}

fn flag(name: &str, metric: &str, op: CompareOp, value: f64) -> MetricDef {
    MetricDef::new(
        name,
        MetricExpr::Flag {
            metric: metric.to_string(),
            op,
            value,
        },
    )
}

fn receipt() -> Preset {
    Preset {
        name: "receipt".to_string(),
        description: "Core inventory totals".to_string(),
        metrics: vec![
            MetricDef::new("groups", MetricExpr::Count),
            sum("files", Files),
            sum("code", Code),
            sum("comments", Comments),
            sum("blanks", Blanks),
            sum("lines", Lines),
            sum("bytes", Bytes),
            sum("tokens", Tokens),
        ],
    }
}

fn health() -> Preset {
    Preset {
        name: "health".to_string(),
        description: "Documentation and layout ratios".to_string(),
        metrics: vec![
            ratio("comment_density", &[Comments], &[Code, Comments], 4),
            ratio("blank_ratio", &[Blanks], &[Code, Comments], 4),
            ratio("avg_file_lines", &[Lines], &[Files], 2),
            ratio("bytes_per_line", &[Bytes], &[Lines], 2),
            flag(
                "low_comment_density",
                "comment_density",
                CompareOp::Lt,
                LOW_COMMENT_DENSITY,
            ),
        ],
    }
}

fn risk() -> Preset {
    Preset {
        name: "risk".to_string(),
        description: "Concentration of code across groups".to_string(),
        metrics: vec![
            MetricDef::new("top_share_code", MetricExpr::MaxShare { field: Code }),
            MetricDef::new("code_gini", MetricExpr::Gini { field: Code }),
            MetricDef::new(
                "p90_group_code",
                MetricExpr::Percentile {
                    field: Code,
                    pct: 0.9,
                },
            ),
            ratio("avg_file_lines", &[Lines], &[Files], 2),
            flag(
                "concentrated",
                "top_share_code",
                CompareOp::Gt,
                CONCENTRATION_SHARE,
            ),
            flag("large_files", "avg_file_lines", CompareOp::Gt, LARGE_FILE_LINES),
        ],
    }
}

fn supply() -> Preset {
    Preset {
        name: "supply".to_string(),
        description: "Volume handed to downstream consumers".to_string(),
        metrics: vec![
            MetricDef::new("groups", MetricExpr::Count),
            sum("files", Files),
            sum("code", Code),
            sum("bytes", Bytes),
            sum("tokens", Tokens),
            ratio("tokens_per_file", &[Tokens], &[Files], 2),
            flag("empty", "code", CompareOp::Eq, 0.0),
        ],
    }
}

pub(crate) fn presets() -> Vec<Preset> {
    vec![receipt(), health(), risk(), supply()]
}
