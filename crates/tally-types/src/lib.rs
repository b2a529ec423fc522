//! # tally-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures and contracts for `tally`.
//! It contains only data types, Serde definitions, and `SCHEMA_VERSION`.
//!
//! ## Stability Policy
//!
//! **JSON-first stability**: The primary contract is the JSON schema, not Rust struct literals.
//!
//! - **JSON consumers**: Stable. New fields have sensible defaults; removed/renamed fields
//!   bump `SCHEMA_VERSION`.
//! - **Rust library consumers**: Semi-stable. New fields may be added in minor versions,
//!   which can break struct literal construction.
//!
//! ## What belongs here
//! * Pure data structs (records, rows, receipts)
//! * Serialization/Deserialization logic
//! * Stability markers (SCHEMA_VERSION)
//!
//! ## What does NOT belong here
//! * File I/O
//! * Argument parsing and validation
//! * Aggregation logic
//! * Tokei dependencies

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The current schema version for all receipt types.
///
/// Increment only when a receipt's JSON shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the synthetic row that absorbs groups beyond `top`.
pub const OTHER_ROW: &str = "Other";

// -----------------------
// Raw records
// -----------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A file owned by its detected language.
    #[default]
    Parent,
    /// An embedded-language segment inside a parent file.
    Child,
}

/// One counting record produced by a record source.
///
/// Child records share the path of their parent file and never carry bytes or
/// tokens, so summing records never double counts file size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub language: String,
    #[serde(default)]
    pub kind: FileKind,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    pub lines: usize,
    #[serde(default)]
    pub bytes: usize,
    #[serde(default)]
    pub tokens: usize,
}

impl FileRecord {
    /// Build a parent record; `lines` is derived from the three line classes.
    pub fn new(
        path: impl Into<String>,
        language: impl Into<String>,
        code: usize,
        comments: usize,
        blanks: usize,
    ) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            kind: FileKind::Parent,
            code,
            comments,
            blanks,
            lines: code + comments + blanks,
            bytes: 0,
            tokens: 0,
        }
    }

    /// Mark the record as an embedded-language segment.
    pub fn child(mut self) -> Self {
        self.kind = FileKind::Child;
        self.bytes = 0;
        self.tokens = 0;
        self
    }

    pub fn with_size(mut self, bytes: usize, tokens: usize) -> Self {
        self.bytes = bytes;
        self.tokens = tokens;
        self
    }
}

// -----------------------
// Rows
// -----------------------

/// Numeric payload shared by rows, totals and diffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub files: usize,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    pub lines: usize,
    pub bytes: usize,
    pub tokens: usize,
}

impl Counts {
    /// Add the line/size fields of a record. File counting is left to the caller,
    /// since child records must not add files.
    pub fn add_record(&mut self, record: &FileRecord) {
        self.code += record.code;
        self.comments += record.comments;
        self.blanks += record.blanks;
        self.lines += record.lines;
        self.bytes += record.bytes;
        self.tokens += record.tokens;
    }

    pub fn merge(&mut self, other: &Counts) {
        self.files += other.files;
        self.code += other.code;
        self.comments += other.comments;
        self.blanks += other.blanks;
        self.lines += other.lines;
        self.bytes += other.bytes;
        self.tokens += other.tokens;
    }

    /// Field-wise sum; `None` if any field overflows.
    pub fn checked_add(&self, other: &Counts) -> Option<Counts> {
        Some(Counts {
            files: self.files.checked_add(other.files)?,
            code: self.code.checked_add(other.code)?,
            comments: self.comments.checked_add(other.comments)?,
            blanks: self.blanks.checked_add(other.blanks)?,
            lines: self.lines.checked_add(other.lines)?,
            bytes: self.bytes.checked_add(other.bytes)?,
            tokens: self.tokens.checked_add(other.tokens)?,
        })
    }

    /// Largest value across all fields.
    pub fn max_field(&self) -> usize {
        CountField::ALL
            .iter()
            .map(|f| self.get(*f))
            .max()
            .unwrap_or(0)
    }

    /// Look up a field by its metric name.
    pub fn get(&self, field: CountField) -> usize {
        match field {
            CountField::Files => self.files,
            CountField::Code => self.code,
            CountField::Comments => self.comments,
            CountField::Blanks => self.blanks,
            CountField::Lines => self.lines,
            CountField::Bytes => self.bytes,
            CountField::Tokens => self.tokens,
        }
    }
}

impl std::iter::Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Self {
        iter.fold(Counts::default(), |mut acc, c| {
            acc.merge(&c);
            acc
        })
    }
}

impl<'a> std::iter::Sum<&'a Counts> for Counts {
    fn sum<I: Iterator<Item = &'a Counts>>(iter: I) -> Self {
        let mut total = Counts::default();
        for c in iter {
            total.merge(c);
        }
        total
    }
}

/// Addressable numeric fields of [`Counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountField {
    Files,
    Code,
    Comments,
    Blanks,
    Lines,
    Bytes,
    Tokens,
}

impl CountField {
    pub const ALL: [CountField; 7] = [
        CountField::Files,
        CountField::Code,
        CountField::Comments,
        CountField::Blanks,
        CountField::Lines,
        CountField::Bytes,
        CountField::Tokens,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CountField::Files => "files",
            CountField::Code => "code",
            CountField::Comments => "comments",
            CountField::Blanks => "blanks",
            CountField::Lines => "lines",
            CountField::Bytes => "bytes",
            CountField::Tokens => "tokens",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRow {
    pub language: String,
    pub files: usize,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    pub lines: usize,
    pub bytes: usize,
    pub tokens: usize,
    pub avg_lines: usize,
}

impl LanguageRow {
    pub fn from_counts(language: impl Into<String>, c: Counts) -> Self {
        Self {
            language: language.into(),
            files: c.files,
            code: c.code,
            comments: c.comments,
            blanks: c.blanks,
            lines: c.lines,
            bytes: c.bytes,
            tokens: c.tokens,
            avg_lines: avg(c.lines, c.files),
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            files: self.files,
            code: self.code,
            comments: self.comments,
            blanks: self.blanks,
            lines: self.lines,
            bytes: self.bytes,
            tokens: self.tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRow {
    pub module: String,
    pub files: usize,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    pub lines: usize,
    pub bytes: usize,
    pub tokens: usize,
    pub avg_lines: usize,
}

impl ModuleRow {
    pub fn from_counts(module: impl Into<String>, c: Counts) -> Self {
        Self {
            module: module.into(),
            files: c.files,
            code: c.code,
            comments: c.comments,
            blanks: c.blanks,
            lines: c.lines,
            bytes: c.bytes,
            tokens: c.tokens,
            avg_lines: avg(c.lines, c.files),
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            files: self.files,
            code: self.code,
            comments: self.comments,
            blanks: self.blanks,
            lines: self.lines,
            bytes: self.bytes,
            tokens: self.tokens,
        }
    }
}

/// A file-level row as emitted by the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub path: String,
    pub module: String,
    pub language: String,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    pub lines: usize,
    pub bytes: usize,
    pub tokens: usize,
}

impl ExportRow {
    pub fn counts(&self) -> Counts {
        Counts {
            files: 1,
            code: self.code,
            comments: self.comments,
            blanks: self.blanks,
            lines: self.lines,
            bytes: self.bytes,
            tokens: self.tokens,
        }
    }
}

/// Average lines per file, rounded to the nearest integer.
pub fn avg(lines: usize, files: usize) -> usize {
    if files == 0 {
        return 0;
    }
    (lines + (files / 2)) / files
}

// -----------------------
// Reports (receipt payloads)
// -----------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangReport {
    pub rows: Vec<LanguageRow>,
    pub total: Counts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub rows: Vec<ModuleRow>,
    pub total: Counts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub rows: Vec<ExportRow>,
    /// Sum over the emitted rows only.
    pub total: Counts,
    /// Number of file rows before `min_code` / `max_rows` were applied.
    pub matched: usize,
}

// -----------------------
// Settings enums (shared by settings, model and receipts)
// -----------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigMode {
    /// Read `tokei.toml` / `.tokeirc` if present.
    #[default]
    Auto,
    /// Ignore config files.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildrenMode {
    /// Fold nested content into its parent (embedded languages into the host
    /// language, deeper directories into the module at `module_depth`).
    #[default]
    Collapse,
    /// Keep nested content as separate rows.
    Separate,
}

impl ChildrenMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChildrenMode::Collapse => "collapse",
            ChildrenMode::Separate => "separate",
        }
    }
}

/// Which aggregation a set of rows was produced by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Lang,
    Module,
}

impl GroupBy {
    pub const fn as_str(self) -> &'static str {
        match self {
            GroupBy::Lang => "lang",
            GroupBy::Module => "module",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine operation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Version,
    Lang,
    Module,
    Export,
    Analyze,
    Diff,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Version,
        Mode::Lang,
        Mode::Module,
        Mode::Export,
        Mode::Analyze,
        Mode::Diff,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Version => "version",
            Mode::Lang => "lang",
            Mode::Module => "module",
            Mode::Export => "export",
            Mode::Analyze => "analyze",
            Mode::Diff => "diff",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`Mode::from_str`] for unrecognized mode strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode: {}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

// -----------------------
// Resolved arguments (echoed in receipts)
// -----------------------

/// Scanner switches, as resolved for a run.
///
/// `no_ignore` implies the three narrower `no_ignore_*` switches once resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Glob patterns to exclude.
    #[serde(default)]
    pub excluded: Vec<String>,

    /// Whether to load `tokei.toml` / `.tokeirc`.
    #[serde(default)]
    pub config: ConfigMode,

    /// Count hidden files and directories.
    #[serde(default)]
    pub hidden: bool,

    /// Don't respect ignore files (.gitignore, .ignore, etc.).
    #[serde(default)]
    pub no_ignore: bool,

    /// Don't respect ignore files in parent directories.
    #[serde(default)]
    pub no_ignore_parent: bool,

    /// Don't respect .ignore and .tokeignore files.
    #[serde(default)]
    pub no_ignore_dot: bool,

    /// Don't respect VCS ignore files (.gitignore, .hgignore, etc.).
    #[serde(default)]
    pub no_ignore_vcs: bool,

    /// Treat doc strings as comments.
    #[serde(default)]
    pub treat_doc_strings_as_comments: bool,
}

impl ScanOptions {
    /// Apply implied switches so the echoed options describe what actually ran.
    pub fn resolved(&self) -> Self {
        Self {
            excluded: self.excluded.clone(),
            config: self.config,
            hidden: self.hidden,
            no_ignore: self.no_ignore,
            no_ignore_parent: self.no_ignore || self.no_ignore_parent,
            no_ignore_dot: self.no_ignore || self.no_ignore_dot,
            no_ignore_vcs: self.no_ignore || self.no_ignore_vcs,
            treat_doc_strings_as_comments: self.treat_doc_strings_as_comments,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionArgsMeta {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangArgsMeta {
    pub paths: Vec<String>,
    pub scan: ScanOptions,
    pub top: Option<usize>,
    pub files: bool,
    /// Depth of the `module` column in per-file rows.
    pub module_depth: usize,
    pub children: ChildrenMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleArgsMeta {
    pub paths: Vec<String>,
    pub scan: ScanOptions,
    pub top: Option<usize>,
    pub module_roots: Vec<String>,
    pub module_depth: usize,
    pub children: ChildrenMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArgsMeta {
    pub paths: Vec<String>,
    pub scan: ScanOptions,
    pub module_roots: Vec<String>,
    pub module_depth: usize,
    pub min_code: usize,
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeArgsMeta {
    pub paths: Vec<String>,
    pub scan: ScanOptions,
    pub preset: String,
    pub group_by: GroupBy,
    pub module_roots: Vec<String>,
    pub module_depth: usize,
    pub children: ChildrenMode,
    /// Names of presets supplied with the request, in registration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_presets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffArgsMeta {
    /// Source label: the path given, or `"inline"` for an embedded receipt.
    pub from: String,
    pub to: String,
}

// -----------------------
// Derived metrics
// -----------------------

/// A derived metric value: a count, a ratio-like number, or a boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Integer(u64),
    Number(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(n) => Some(*n as f64),
            MetricValue::Number(n) => Some(*n),
            MetricValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetricValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Metrics computed for one preset. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub preset: String,
    pub metrics: BTreeMap<String, MetricValue>,
}

// -----------------------
// Diff types
// -----------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsDelta {
    pub files: i64,
    pub code: i64,
    pub comments: i64,
    pub blanks: i64,
    pub lines: i64,
    pub bytes: i64,
    pub tokens: i64,
}

/// Relative change per field. `None` (JSON `null`) marks an undefined change:
/// the `from` side was zero and the value moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PctChange {
    pub files: Option<f64>,
    pub code: Option<f64>,
    pub comments: Option<f64>,
    pub blanks: Option<f64>,
    pub lines: Option<f64>,
    pub bytes: Option<f64>,
    pub tokens: Option<f64>,
}

/// Changes for a single key (language or module name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    pub key: String,
    pub from: Counts,
    pub to: Counts,
    pub delta: CountsDelta,
    pub pct_change: PctChange,
}

// -----------------------
// Receipts
// -----------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    pub fn current() -> Self {
        Self {
            name: "tally".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: VersionArgsMeta,
    pub rows: Vec<ToolInfo>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: LangArgsMeta,
    pub rows: Vec<LanguageRow>,
    pub total: Counts,
    /// Per-file rows, present when `files` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ExportRow>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: ModuleArgsMeta,
    pub rows: Vec<ModuleRow>,
    pub total: Counts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: ExportArgsMeta,
    pub rows: Vec<ExportRow>,
    pub total: Counts,
    pub matched: usize,
}

/// Rows of an analyze receipt, shaped by its `group_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupedRows {
    Lang(Vec<LanguageRow>),
    Module(Vec<ModuleRow>),
}

impl GroupedRows {
    pub fn len(&self) -> usize {
        match self {
            GroupedRows::Lang(rows) => rows.len(),
            GroupedRows::Module(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(key, counts)` pairs in row order.
    pub fn keyed_counts(&self) -> Vec<(String, Counts)> {
        match self {
            GroupedRows::Lang(rows) => rows
                .iter()
                .map(|r| (r.language.clone(), r.counts()))
                .collect(),
            GroupedRows::Module(rows) => rows
                .iter()
                .map(|r| (r.module.clone(), r.counts()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: AnalyzeArgsMeta,
    pub rows: GroupedRows,
    pub total: Counts,
    pub derived: DerivedMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub args: DiffArgsMeta,
    /// The row kind both inputs were compared on.
    pub compared: GroupBy,
    pub rows: Vec<DiffRow>,
    pub total: DiffRow,
}

/// The single success shape of every mode, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Receipt {
    Version(VersionReceipt),
    Lang(LangReceipt),
    Module(ModuleReceipt),
    Export(ExportReceipt),
    Analyze(AnalyzeReceipt),
    Diff(DiffReceipt),
}

impl Receipt {
    pub fn mode(&self) -> Mode {
        match self {
            Receipt::Version(_) => Mode::Version,
            Receipt::Lang(_) => Mode::Lang,
            Receipt::Module(_) => Mode::Module,
            Receipt::Export(_) => Mode::Export,
            Receipt::Analyze(_) => Mode::Analyze,
            Receipt::Diff(_) => Mode::Diff,
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            Receipt::Version(r) => r.schema_version,
            Receipt::Lang(r) => r.schema_version,
            Receipt::Module(r) => r.schema_version,
            Receipt::Export(r) => r.schema_version,
            Receipt::Analyze(r) => r.schema_version,
            Receipt::Diff(r) => r.schema_version,
        }
    }
}
