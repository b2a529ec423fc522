//! # tally-core
//!
//! **Tier 4 (Engine)**
//!
//! This crate is the **primary library interface** for `tally`.
//! It validates settings, asks a [`RecordSource`] for records, routes them to
//! the aggregator, exporter, analyzer or diff engine, and wraps the result in a
//! versioned receipt.
//!
//! If you are embedding `tally` into another Rust application, depend on this
//! crate and `tally-types`. Hosts that speak strings use [`ffi::run_json`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use tally_core::{lang_workflow, settings::{LangSettings, ScanSettings}};
//! use tally_scan::TokeiSource;
//!
//! let scan = ScanSettings::current_dir();
//! let lang = LangSettings {
//!     top: Some(10),
//!     ..Default::default()
//! };
//!
//! let receipt = lang_workflow(&TokeiSource::new(), &scan, &lang).expect("Scan failed");
//! println!("Scanned {} languages", receipt.rows.len());
//! ```

pub mod error;
pub mod ffi;

use std::fs;
use std::path::Path;

use log::debug;

pub use tally_settings as settings;
pub use tally_types as types;

use tally_analysis::{PresetRegistry, evaluate};
use tally_diff::{DiffError, RowSet, compute_diff};
use tally_scan::RecordSource;
use tally_settings::{
    AnalyzeSettings, DEFAULT_MODULE_DEPTH, DiffSettings, DiffSource, ExportSettings, LangSettings,
    ModuleSettings, ScanSettings,
};
use tally_types::{
    AnalyzeArgsMeta, AnalyzeReceipt, Counts, DiffArgsMeta, DiffReceipt, ExportArgsMeta,
    ExportReceipt, FileRecord, GroupBy, GroupedRows, LangArgsMeta, LangReceipt, ModuleArgsMeta,
    ModuleReceipt, Receipt, SCHEMA_VERSION, ToolInfo, VersionArgsMeta, VersionReceipt,
};

pub use error::{ErrorCode, ErrorEnvelope, ErrorKind, TallyError};

/// Reports the tool identity and version. Takes no arguments.
pub fn version_workflow() -> VersionReceipt {
    let tool = ToolInfo::current();
    VersionReceipt {
        schema_version: SCHEMA_VERSION,
        version: tool.version.clone(),
        tool: tool.clone(),
        args: VersionArgsMeta::default(),
        rows: vec![tool],
    }
}

fn collect(source: &dyn RecordSource, scan: &ScanSettings) -> Result<Vec<FileRecord>, TallyError> {
    scan.validate()?;
    let records = source.collect(&scan.paths, &scan.options.resolved())?;
    debug!(
        "collected {} records from {} path(s)",
        records.len(),
        scan.paths.len()
    );
    Ok(records)
}

/// Runs the language inventory: Scan -> Model -> Receipt.
pub fn lang_workflow(
    source: &dyn RecordSource,
    scan: &ScanSettings,
    lang: &LangSettings,
) -> Result<LangReceipt, TallyError> {
    lang.validate()?;
    let records = collect(source, scan)?;

    let report = tally_model::create_lang_report(&records, lang);
    let files = lang
        .files
        .then(|| tally_model::file_rows(&records, &[], DEFAULT_MODULE_DEPTH));
    debug!("lang: {} row(s), {} code lines", report.rows.len(), report.total.code);

    Ok(LangReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        args: LangArgsMeta {
            paths: scan.paths.clone(),
            scan: scan.options.resolved(),
            top: lang.top,
            files: lang.files,
            module_depth: DEFAULT_MODULE_DEPTH,
            children: lang.children,
        },
        rows: report.rows,
        total: report.total,
        files,
    })
}

/// Runs the module inventory.
pub fn module_workflow(
    source: &dyn RecordSource,
    scan: &ScanSettings,
    module: &ModuleSettings,
) -> Result<ModuleReceipt, TallyError> {
    module.validate()?;
    let records = collect(source, scan)?;

    let report = tally_model::create_module_report(&records, module);
    debug!("module: {} row(s), {} code lines", report.rows.len(), report.total.code);

    Ok(ModuleReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        args: ModuleArgsMeta {
            paths: scan.paths.clone(),
            scan: scan.options.resolved(),
            top: module.top,
            module_roots: module.module_roots.clone(),
            module_depth: module.module_depth,
            children: module.children,
        },
        rows: report.rows,
        total: report.total,
    })
}

/// Runs the file-level export.
pub fn export_workflow(
    source: &dyn RecordSource,
    scan: &ScanSettings,
    export: &ExportSettings,
) -> Result<ExportReceipt, TallyError> {
    export.validate()?;
    let records = collect(source, scan)?;

    let data = tally_model::create_export_data(&records, export);
    debug!("export: {} of {} file row(s) emitted", data.rows.len(), data.matched);

    Ok(ExportReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        args: ExportArgsMeta {
            paths: scan.paths.clone(),
            scan: scan.options.resolved(),
            module_roots: export.module_roots.clone(),
            module_depth: export.module_depth,
            min_code: export.min_code,
            max_rows: export.max_rows,
        },
        rows: data.rows,
        total: data.total,
        matched: data.matched,
    })
}

/// Runs a derived-metrics preset over the language or module rows.
///
/// The preset is resolved before any records are collected, so an unknown
/// preset never touches the filesystem. `custom_presets` names the presets
/// the caller registered for this request; it is echoed in the receipt args.
pub fn analyze_workflow(
    source: &dyn RecordSource,
    scan: &ScanSettings,
    analyze: &AnalyzeSettings,
    registry: &PresetRegistry,
    custom_presets: Vec<String>,
) -> Result<AnalyzeReceipt, TallyError> {
    analyze.validate()?;
    let preset = registry.get(&analyze.preset)?;
    let records = collect(source, scan)?;

    let (rows, total) = match analyze.group_by {
        GroupBy::Lang => {
            let report = tally_model::create_lang_report(&records, &analyze.lang_settings());
            (GroupedRows::Lang(report.rows), report.total)
        }
        GroupBy::Module => {
            let report = tally_model::create_module_report(&records, &analyze.module_settings());
            (GroupedRows::Module(report.rows), report.total)
        }
    };

    let counts: Vec<Counts> = rows
        .keyed_counts()
        .into_iter()
        .map(|(_, counts)| counts)
        .collect();
    let derived = evaluate(preset, &counts)?;
    debug!(
        "analyze: preset '{}' over {} {} row(s)",
        preset.name,
        counts.len(),
        analyze.group_by
    );

    Ok(AnalyzeReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        args: AnalyzeArgsMeta {
            paths: scan.paths.clone(),
            scan: scan.options.resolved(),
            preset: analyze.preset.clone(),
            group_by: analyze.group_by,
            module_roots: analyze.module_roots.clone(),
            module_depth: analyze.module_depth,
            children: analyze.children,
            custom_presets,
        },
        rows,
        total,
        derived,
    })
}

/// Compares two receipts row by row.
///
/// Each side is an inline receipt, a receipt file, or a path that is scanned
/// into a default `lang` receipt through `source`.
pub fn diff_workflow(
    source: &dyn RecordSource,
    diff: &DiffSettings,
) -> Result<DiffReceipt, TallyError> {
    diff.validate()?;
    let from = resolve_diff_side(source, &diff.from)?;
    let to = resolve_diff_side(source, &diff.to)?;

    let report = compute_diff(
        &diff_rows(&diff.from, &from)?,
        &diff_rows(&diff.to, &to)?,
    )?;
    debug!(
        "diff: {} {} row(s) compared",
        report.rows.len(),
        report.compared
    );

    Ok(DiffReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        args: DiffArgsMeta {
            from: diff.from.label(),
            to: diff.to.label(),
        },
        compared: report.compared,
        rows: report.rows,
        total: report.total,
    })
}

fn resolve_diff_side(source: &dyn RecordSource, side: &DiffSource) -> Result<Receipt, TallyError> {
    match side {
        DiffSource::Inline(value) => parse_receipt("inline", value.clone()),
        DiffSource::Reference(reference) => {
            let path = Path::new(reference);
            if path.is_file() {
                debug!("diff: reading receipt file {reference}");
                let text = fs::read_to_string(path)?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| TallyError::invalid_receipt(reference, e))?;
                parse_receipt(reference, value)
            } else {
                debug!("diff: scanning {reference}");
                let scan = ScanSettings::for_paths(vec![reference.clone()]);
                lang_workflow(source, &scan, &LangSettings::default()).map(Receipt::Lang)
            }
        }
    }
}

/// Comparable rows of one side; unusable counts are blamed on that side.
fn diff_rows(side: &DiffSource, receipt: &Receipt) -> Result<RowSet, TallyError> {
    RowSet::from_receipt(receipt).map_err(|err| match err {
        DiffError::OutOfRange { .. } => TallyError::invalid_receipt(&side.label(), err),
        other => other.into(),
    })
}

fn parse_receipt(label: &str, value: serde_json::Value) -> Result<Receipt, TallyError> {
    let receipt: Receipt =
        serde_json::from_value(value).map_err(|e| TallyError::invalid_receipt(label, e))?;
    if receipt.schema_version() != SCHEMA_VERSION {
        return Err(TallyError::invalid_receipt(
            label,
            format!(
                "unsupported schema_version {} (expected {SCHEMA_VERSION})",
                receipt.schema_version()
            ),
        ));
    }
    Ok(receipt)
}
