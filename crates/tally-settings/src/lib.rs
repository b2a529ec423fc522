//! # tally-settings
//!
//! **Tier 0 (Pure Settings)**
//!
//! Typed settings for every engine mode. Loose argument maps are turned into
//! these structs once, validated once, and then handed to the aggregation
//! layers as plain data.
//!
//! ## What belongs here
//! * Pure data types with Serde derive
//! * Scan, language, module, export, analyze, diff settings
//! * Default values and validation
//!
//! ## What does NOT belong here
//! * JSON argument parsing (use tally-core)
//! * I/O operations
//! * Business logic

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tally_types::{ChildrenMode, ConfigMode, GroupBy, ScanOptions};

/// Default module depth when none is given.
pub const DEFAULT_MODULE_DEPTH: usize = 2;

/// Default analyzer preset.
pub const DEFAULT_PRESET: &str = "receipt";

/// A settings value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be at least 1")]
    NotPositive { field: &'static str },

    #[error("{field} must not contain empty entries")]
    EmptyEntry { field: &'static str },

    #[error("paths must not be empty")]
    NoPaths,

    #[error("preset name must not be empty")]
    EmptyPreset,
}

fn check_positive(field: &'static str, value: Option<usize>) -> Result<(), SettingsError> {
    match value {
        Some(0) => Err(SettingsError::NotPositive { field }),
        _ => Ok(()),
    }
}

fn check_entries(field: &'static str, values: &[String]) -> Result<(), SettingsError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(SettingsError::EmptyEntry { field });
    }
    Ok(())
}

/// Global scan settings shared by all scanning operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Paths to scan (defaults to `["."]`).
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    /// Scan options (excludes, ignore flags, etc.).
    #[serde(flatten)]
    pub options: ScanOptions,
}

fn default_paths() -> Vec<String> {
    vec![".".to_string()]
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl ScanSettings {
    /// Create settings for scanning the current directory with defaults.
    pub fn current_dir() -> Self {
        Self::for_paths(default_paths())
    }

    /// Create settings for scanning specific paths.
    pub fn for_paths(paths: Vec<String>) -> Self {
        Self {
            paths,
            options: ScanOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.paths.is_empty() {
            return Err(SettingsError::NoPaths);
        }
        check_entries("paths", &self.paths)?;
        check_entries("excluded", &self.options.excluded)
    }
}

/// Settings for the by-language aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangSettings {
    /// Keep the first N rows and fold the rest into `Other` (unset = all).
    #[serde(default)]
    pub top: Option<usize>,

    /// Also emit one row per file.
    #[serde(default)]
    pub files: bool,

    /// How to handle embedded languages.
    #[serde(default)]
    pub children: ChildrenMode,
}

impl LangSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive("top", self.top)
    }
}

/// Settings for the by-module aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Keep the first N modules and fold the rest into `Other` (unset = all).
    #[serde(default)]
    pub top: Option<usize>,

    /// Directory prefixes that define modules. Empty means every top-level
    /// directory is a module.
    #[serde(default)]
    pub module_roots: Vec<String>,

    /// Directory segments kept in a module key.
    #[serde(default = "default_module_depth")]
    pub module_depth: usize,

    /// Collapse deeper directories into their ancestor, or keep them apart.
    #[serde(default)]
    pub children: ChildrenMode,
}

fn default_module_depth() -> usize {
    DEFAULT_MODULE_DEPTH
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            top: None,
            module_roots: Vec::new(),
            module_depth: DEFAULT_MODULE_DEPTH,
            children: ChildrenMode::Collapse,
        }
    }
}

impl ModuleSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive("top", self.top)?;
        check_positive("module_depth", Some(self.module_depth))?;
        check_entries("module_roots", &self.module_roots)
    }
}

/// Settings for file-level export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Module roots (see `ModuleSettings`).
    #[serde(default)]
    pub module_roots: Vec<String>,

    /// Module depth (see `ModuleSettings`).
    #[serde(default = "default_module_depth")]
    pub module_depth: usize,

    /// Drop rows with fewer than N code lines.
    #[serde(default)]
    pub min_code: usize,

    /// Stop after emitting N rows (unset = unlimited).
    #[serde(default)]
    pub max_rows: Option<usize>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            module_roots: Vec::new(),
            module_depth: DEFAULT_MODULE_DEPTH,
            min_code: 0,
            max_rows: None,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive("max_rows", self.max_rows)?;
        check_positive("module_depth", Some(self.module_depth))?;
        check_entries("module_roots", &self.module_roots)
    }
}

/// Settings for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeSettings {
    /// Analysis preset to run.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Aggregation the preset is evaluated over.
    #[serde(default)]
    pub group_by: GroupBy,

    /// Module roots, used when `group_by = module`.
    #[serde(default)]
    pub module_roots: Vec<String>,

    /// Module depth, used when `group_by = module`.
    #[serde(default = "default_module_depth")]
    pub module_depth: usize,

    /// Children policy passed to the chosen aggregation.
    #[serde(default)]
    pub children: ChildrenMode,
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            group_by: GroupBy::Lang,
            module_roots: Vec::new(),
            module_depth: DEFAULT_MODULE_DEPTH,
            children: ChildrenMode::Collapse,
        }
    }
}

impl AnalyzeSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.preset.trim().is_empty() {
            return Err(SettingsError::EmptyPreset);
        }
        check_positive("module_depth", Some(self.module_depth))?;
        check_entries("module_roots", &self.module_roots)
    }

    /// The language settings implied by this analysis.
    pub fn lang_settings(&self) -> LangSettings {
        LangSettings {
            top: None,
            files: false,
            children: self.children,
        }
    }

    /// The module settings implied by this analysis.
    pub fn module_settings(&self) -> ModuleSettings {
        ModuleSettings {
            top: None,
            module_roots: self.module_roots.clone(),
            module_depth: self.module_depth,
            children: self.children,
        }
    }
}

/// One side of a diff: an inline receipt or a string reference.
///
/// A string names either a receipt file or a path to scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffSource {
    Reference(String),
    Inline(serde_json::Value),
}

impl DiffSource {
    /// Label echoed in the receipt args.
    pub fn label(&self) -> String {
        match self {
            DiffSource::Reference(s) => s.clone(),
            DiffSource::Inline(_) => "inline".to_string(),
        }
    }
}

/// Settings for diff comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSettings {
    /// Base receipt to compare from.
    pub from: DiffSource,

    /// Target receipt to compare to.
    pub to: DiffSource,
}

impl DiffSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, source) in [("from", &self.from), ("to", &self.to)] {
            if let DiffSource::Reference(s) = source
                && s.trim().is_empty()
            {
                return Err(SettingsError::EmptyEntry { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_settings_default_is_current_dir() {
        let s = ScanSettings::default();
        assert_eq!(s.paths, vec!["."]);
        assert!(s.options.excluded.is_empty());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn scan_settings_rejects_empty_paths() {
        assert_eq!(
            ScanSettings::for_paths(vec![]).validate(),
            Err(SettingsError::NoPaths)
        );
        assert_eq!(
            ScanSettings::for_paths(vec![" ".into()]).validate(),
            Err(SettingsError::EmptyEntry { field: "paths" })
        );
    }

    #[test]
    fn scan_settings_flatten_reads_options() {
        let s: ScanSettings =
            serde_json::from_str(r#"{"paths":["src"],"hidden":true,"config":"none"}"#).unwrap();
        assert_eq!(s.paths, vec!["src"]);
        assert!(s.options.hidden);
        assert_eq!(s.options.config, ConfigMode::None);
    }

    #[test]
    fn zero_top_is_rejected() {
        let s = LangSettings {
            top: Some(0),
            ..Default::default()
        };
        assert_eq!(s.validate(), Err(SettingsError::NotPositive { field: "top" }));
    }

    #[test]
    fn zero_module_depth_is_rejected() {
        let s = ModuleSettings {
            module_depth: 0,
            ..Default::default()
        };
        assert_eq!(
            s.validate(),
            Err(SettingsError::NotPositive {
                field: "module_depth"
            })
        );
    }

    #[test]
    fn zero_max_rows_is_rejected() {
        let s = ExportSettings {
            max_rows: Some(0),
            ..Default::default()
        };
        assert!(s.validate().is_err());
        assert!(ExportSettings::default().validate().is_ok());
    }

    #[test]
    fn analyze_defaults() {
        let s: AnalyzeSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.preset, "receipt");
        assert_eq!(s.group_by, GroupBy::Lang);
        assert_eq!(s.module_depth, 2);
        assert_eq!(
            AnalyzeSettings {
                preset: "  ".into(),
                ..Default::default()
            }
            .validate(),
            Err(SettingsError::EmptyPreset)
        );
    }

    #[test]
    fn diff_source_untagged() {
        let s: DiffSettings =
            serde_json::from_str(r#"{"from":"base.json","to":{"mode":"lang"}}"#).unwrap();
        assert_eq!(s.from.label(), "base.json");
        assert_eq!(s.to.label(), "inline");
        assert!(s.validate().is_ok());
    }
}
