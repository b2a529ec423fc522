//! JSON entrypoint for hosts that speak strings.
//!
//! `run_json` accepts a mode string and a JSON argument object and returns
//! exactly one JSON document.
//!
//! ## Response shapes
//!
//! - Success: the receipt itself, `{"mode": "...", "schema_version": 1, ...}`
//! - Error: `{"error": true, "code": "...", "message": "...", "details": ...}`
//!
//! ## Strict Parsing
//!
//! - Missing or null keys use defaults
//! - Invalid values return errors (no silent fallback to defaults)
//! - Each key is looked up first in its nested object (`scan` for scan
//!   options, the mode name for mode options), then at the root

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use tally_analysis::{PresetRegistry, presets_from_json};
use tally_scan::{RecordSource, TokeiSource};
use tally_types::{Mode, Receipt, SCHEMA_VERSION};

use crate::error::{ErrorEnvelope, TallyError};
use crate::settings::{
    AnalyzeSettings, ChildrenMode, ConfigMode, DEFAULT_MODULE_DEPTH, DEFAULT_PRESET, DiffSettings,
    DiffSource, ExportSettings, GroupBy, LangSettings, ModuleSettings, ScanOptions, ScanSettings,
};
use crate::{
    analyze_workflow, diff_workflow, export_workflow, lang_workflow, module_workflow,
    version_workflow,
};

/// Run a tally operation with JSON arguments against the filesystem.
///
/// # Arguments
///
/// * `mode` - "version", "lang", "module", "export", "analyze" or "diff"
/// * `args_json` - JSON object holding the arguments
///
/// # Example
///
/// ```ignore
/// let result = run_json("lang", r#"{"paths": ["."], "top": 10}"#);
/// // Returns: {"mode": "lang", "schema_version": 1, "rows": [...], ...}
/// ```
pub fn run_json(mode: &str, args_json: &str) -> String {
    run_json_with_source(&TokeiSource::new(), mode, args_json)
}

/// Same as [`run_json`], collecting records through `source`.
pub fn run_json_with_source(source: &dyn RecordSource, mode: &str, args_json: &str) -> String {
    let result = run(source, mode, args_json).and_then(|receipt| {
        serde_json::to_string(&receipt).map_err(TallyError::internal)
    });
    match result {
        Ok(json) => json,
        Err(err) => {
            debug!("{mode}: {err}");
            ErrorEnvelope::from(err).to_json()
        }
    }
}

/// Typed counterpart of [`run_json_with_source`].
///
/// The payload is parsed before the mode, so a malformed payload is reported
/// as `invalid_json` whatever the mode.
pub fn run(source: &dyn RecordSource, mode: &str, args_json: &str) -> Result<Receipt, TallyError> {
    let args: Value = serde_json::from_str(args_json)?;
    let root = args
        .as_object()
        .ok_or_else(|| TallyError::invalid_json("arguments must be a JSON object"))?;
    let mode: Mode = mode.parse().map_err(|_| TallyError::invalid_mode(mode))?;
    debug!("dispatching {mode}");

    match mode {
        Mode::Version => Ok(Receipt::Version(version_workflow())),
        Mode::Lang => {
            let scan = parse_scan_settings(root)?;
            let settings = parse_lang_settings(&Args::new(root, "lang")?)?;
            lang_workflow(source, &scan, &settings).map(Receipt::Lang)
        }
        Mode::Module => {
            let scan = parse_scan_settings(root)?;
            let settings = parse_module_settings(&Args::new(root, "module")?)?;
            module_workflow(source, &scan, &settings).map(Receipt::Module)
        }
        Mode::Export => {
            let scan = parse_scan_settings(root)?;
            let settings = parse_export_settings(&Args::new(root, "export")?)?;
            export_workflow(source, &scan, &settings).map(Receipt::Export)
        }
        Mode::Analyze => {
            let scan = parse_scan_settings(root)?;
            let args = Args::new(root, "analyze")?;
            let settings = parse_analyze_settings(&args)?;

            // Request-local: custom presets never leak into other calls.
            let mut registry = PresetRegistry::builtin();
            let custom = match args.get("presets") {
                None => Vec::new(),
                Some(value) => registry.extend(presets_from_json(value)?)?,
            };
            analyze_workflow(source, &scan, &settings, &registry, custom).map(Receipt::Analyze)
        }
        Mode::Diff => {
            let settings = parse_diff_settings(&Args::new(root, "diff")?)?;
            diff_workflow(source, &settings).map(Receipt::Diff)
        }
    }
}

// ============================================================================
// Argument lookup
// ============================================================================

/// A view over the argument object: a nested section first, then the root.
struct Args<'a> {
    root: &'a Map<String, Value>,
    section: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(root: &'a Map<String, Value>, section: &str) -> Result<Self, TallyError> {
        let section = match root.get(section) {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => return Err(TallyError::invalid_field(section, "an object")),
        };
        Ok(Self { root, section })
    }

    /// The value for `field`, treating null as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.section
            .and_then(|s| s.get(field))
            .filter(|v| !v.is_null())
            .or_else(|| self.root.get(field).filter(|v| !v.is_null()))
    }
}

// ============================================================================
// Strict field parsers
// ============================================================================

/// Parse a boolean field strictly: missing/null -> default, non-bool -> error.
fn parse_bool(args: &Args<'_>, field: &str, default: bool) -> Result<bool, TallyError> {
    match args.get(field) {
        None => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| TallyError::invalid_field(field, "a boolean (true or false)")),
    }
}

/// Parse a usize field strictly: missing/null -> default, non-number -> error.
fn parse_usize(args: &Args<'_>, field: &str, default: usize) -> Result<usize, TallyError> {
    parse_optional_usize(args, field).map(|v| v.unwrap_or(default))
}

/// Parse an optional usize field strictly: missing/null -> None, non-number -> error.
fn parse_optional_usize(args: &Args<'_>, field: &str) -> Result<Option<usize>, TallyError> {
    match args.get(field) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| TallyError::invalid_field(field, "a non-negative integer")),
    }
}

/// Parse a string field strictly: missing/null -> default, non-string -> error.
fn parse_string(args: &Args<'_>, field: &str, default: &str) -> Result<String, TallyError> {
    match args.get(field) {
        None => Ok(default.to_string()),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TallyError::invalid_field(field, "a string")),
    }
}

/// Parse a string array field strictly: missing/null -> default, invalid -> error.
fn parse_string_array(
    args: &Args<'_>,
    field: &str,
    default: Vec<String>,
) -> Result<Vec<String>, TallyError> {
    match args.get(field) {
        None => Ok(default),
        Some(v) => serde_json::from_value::<Vec<String>>(v.clone())
            .map_err(|_| TallyError::invalid_field(field, "an array of strings")),
    }
}

/// Parse a closed enumeration strictly; `expected` lists the accepted names.
fn parse_enum<T: DeserializeOwned>(
    args: &Args<'_>,
    field: &str,
    default: T,
    expected: &str,
) -> Result<T, TallyError> {
    match args.get(field) {
        None => Ok(default),
        Some(v) => serde_json::from_value::<T>(v.clone())
            .map_err(|_| TallyError::invalid_field(field, expected)),
    }
}

fn parse_children_mode(args: &Args<'_>) -> Result<ChildrenMode, TallyError> {
    parse_enum(args, "children", ChildrenMode::Collapse, "'collapse' or 'separate'")
}

// ============================================================================
// Settings parsers
// ============================================================================

fn parse_scan_settings(root: &Map<String, Value>) -> Result<ScanSettings, TallyError> {
    let args = Args::new(root, "scan")?;
    Ok(ScanSettings {
        paths: parse_string_array(&args, "paths", vec![".".to_string()])?,
        options: ScanOptions {
            excluded: parse_string_array(&args, "excluded", vec![])?,
            config: parse_enum(&args, "config", ConfigMode::Auto, "'auto' or 'none'")?,
            hidden: parse_bool(&args, "hidden", false)?,
            no_ignore: parse_bool(&args, "no_ignore", false)?,
            no_ignore_parent: parse_bool(&args, "no_ignore_parent", false)?,
            no_ignore_dot: parse_bool(&args, "no_ignore_dot", false)?,
            no_ignore_vcs: parse_bool(&args, "no_ignore_vcs", false)?,
            treat_doc_strings_as_comments: parse_bool(
                &args,
                "treat_doc_strings_as_comments",
                false,
            )?,
        },
    })
}

fn parse_lang_settings(args: &Args<'_>) -> Result<LangSettings, TallyError> {
    Ok(LangSettings {
        top: parse_optional_usize(args, "top")?,
        files: parse_bool(args, "files", false)?,
        children: parse_children_mode(args)?,
    })
}

fn parse_module_settings(args: &Args<'_>) -> Result<ModuleSettings, TallyError> {
    Ok(ModuleSettings {
        top: parse_optional_usize(args, "top")?,
        module_roots: parse_string_array(args, "module_roots", vec![])?,
        module_depth: parse_usize(args, "module_depth", DEFAULT_MODULE_DEPTH)?,
        children: parse_children_mode(args)?,
    })
}

fn parse_export_settings(args: &Args<'_>) -> Result<ExportSettings, TallyError> {
    Ok(ExportSettings {
        module_roots: parse_string_array(args, "module_roots", vec![])?,
        module_depth: parse_usize(args, "module_depth", DEFAULT_MODULE_DEPTH)?,
        min_code: parse_usize(args, "min_code", 0)?,
        max_rows: parse_optional_usize(args, "max_rows")?,
    })
}

fn parse_analyze_settings(args: &Args<'_>) -> Result<AnalyzeSettings, TallyError> {
    Ok(AnalyzeSettings {
        preset: parse_string(args, "preset", DEFAULT_PRESET)?,
        group_by: parse_enum(args, "group_by", GroupBy::Lang, "'lang' or 'module'")?,
        module_roots: parse_string_array(args, "module_roots", vec![])?,
        module_depth: parse_usize(args, "module_depth", DEFAULT_MODULE_DEPTH)?,
        children: parse_children_mode(args)?,
    })
}

fn parse_diff_source(args: &Args<'_>, field: &str) -> Result<DiffSource, TallyError> {
    match args.get(field) {
        None => Err(TallyError::invalid_settings(format!(
            "Missing '{field}' field for diff"
        ))),
        Some(Value::String(s)) => Ok(DiffSource::Reference(s.clone())),
        Some(v @ Value::Object(_)) => Ok(DiffSource::Inline(v.clone())),
        Some(_) => Err(TallyError::invalid_field(
            field,
            "a receipt object or a path string",
        )),
    }
}

fn parse_diff_settings(args: &Args<'_>) -> Result<DiffSettings, TallyError> {
    Ok(DiffSettings {
        from: parse_diff_source(args, "from")?,
        to: parse_diff_source(args, "to")?,
    })
}

/// Get the tally version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the receipt schema version.
pub fn schema_version() -> u32 {
    SCHEMA_VERSION
}
