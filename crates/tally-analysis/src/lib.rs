//! # tally-analysis
//!
//! **Tier 3 (Analysis)**
//!
//! Derived metrics over aggregated rows. A preset is a table of metric
//! definitions; nothing about a preset is hard-coded in the evaluator, so new
//! presets can be registered from TOML or JSON without touching code.
//!
//! ## What belongs here
//! * Metric definitions and their evaluation
//! * The preset registry and built-in presets
//!
//! ## What does NOT belong here
//! * Aggregation (use tally-model)
//! * Receipt construction

mod builtin;
mod error;
mod eval;
mod metric;
mod registry;

pub use error::AnalysisError;
pub use eval::evaluate;
pub use metric::{CompareOp, DEFAULT_DECIMALS, MAX_DECIMALS, MetricDef, MetricExpr, Preset};
pub use registry::{PresetRegistry, presets_from_json};
