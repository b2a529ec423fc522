//! Structured error types for the JSON boundary.
//!
//! Every failure inside the engine becomes a [`TallyError`]; `run_json`
//! flattens it to an [`ErrorEnvelope`].

use serde::{Deserialize, Serialize};
use std::fmt;

use tally_analysis::AnalysisError;
use tally_diff::DiffError;
use tally_scan::ScanError;
use tally_settings::SettingsError;

/// Error codes for tally operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Arguments are not JSON, or not a JSON object.
    InvalidJson,
    /// Unknown operation mode.
    InvalidMode,
    /// A setting has the wrong type or an out-of-range value.
    InvalidSettings,
    /// The requested analyzer preset is not registered.
    UnknownPreset,
    /// A preset definition failed to parse or validate.
    InvalidPreset,
    /// The two diff inputs cannot be compared.
    IncompatibleReceipts,
    /// Path does not exist.
    PathNotFound,
    /// Record collection failed.
    ScanError,
    /// I/O error while reading an input.
    IoError,
    /// A receipt handed to `diff` could not be read.
    InvalidReceipt,
    /// Internal error (unexpected state).
    InternalError,
}

/// Family an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Validation,
    Source,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::InvalidMode => "invalid_mode",
            ErrorCode::InvalidSettings => "invalid_settings",
            ErrorCode::UnknownPreset => "unknown_preset",
            ErrorCode::InvalidPreset => "invalid_preset",
            ErrorCode::IncompatibleReceipts => "incompatible_receipts",
            ErrorCode::PathNotFound => "path_not_found",
            ErrorCode::ScanError => "scan_error",
            ErrorCode::IoError => "io_error",
            ErrorCode::InvalidReceipt => "invalid_receipt",
            ErrorCode::InternalError => "internal_error",
        }
    }

    pub const fn kind(self) -> ErrorKind {
        match self {
            ErrorCode::InvalidJson => ErrorKind::Input,
            ErrorCode::InvalidMode
            | ErrorCode::InvalidSettings
            | ErrorCode::UnknownPreset
            | ErrorCode::InvalidPreset
            | ErrorCode::IncompatibleReceipts => ErrorKind::Validation,
            ErrorCode::PathNotFound
            | ErrorCode::ScanError
            | ErrorCode::IoError
            | ErrorCode::InvalidReceipt => ErrorKind::Source,
            ErrorCode::InternalError => ErrorKind::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error for FFI-friendly error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyError {
    /// Error code for programmatic handling.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TallyError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an error with additional details.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn invalid_json(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidJson, format!("Invalid JSON: {err}"))
    }

    pub fn invalid_mode(mode: &str) -> Self {
        Self::with_details(
            ErrorCode::InvalidMode,
            format!("Unknown mode: {mode}"),
            "expected one of: version, lang, module, export, analyze, diff",
        )
    }

    /// A field holds a value of the wrong type or outside its enumeration.
    pub fn invalid_field(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidSettings,
            format!("Invalid value for '{field}': expected {expected}"),
        )
    }

    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSettings, message)
    }

    pub fn path_not_found(path: &str) -> Self {
        Self::with_details(ErrorCode::PathNotFound, format!("Path not found: {path}"), path)
    }

    pub fn scan_error(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ScanError, format!("Scan failed: {err}"))
    }

    pub fn io_error(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::IoError, format!("I/O error: {err}"))
    }

    /// A diff input is not a readable receipt. `source` names the input.
    pub fn invalid_receipt(source: &str, err: impl fmt::Display) -> Self {
        Self::with_details(
            ErrorCode::InvalidReceipt,
            format!("Invalid receipt: {err}"),
            source,
        )
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, format!("Internal error: {err}"))
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","message":"{}"}}"#, self.code, self.message)
        })
    }
}

impl fmt::Display for TallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "[{}] {}: {}", self.code, self.message, details)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl std::error::Error for TallyError {}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_json(err)
    }
}

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err)
    }
}

impl From<SettingsError> for TallyError {
    fn from(err: SettingsError) -> Self {
        Self::invalid_settings(err.to_string())
    }
}

impl From<ScanError> for TallyError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::PathNotFound(path) => Self::path_not_found(&path),
            ScanError::Scan(msg) => Self::scan_error(msg),
        }
    }
}

impl From<AnalysisError> for TallyError {
    fn from(err: AnalysisError) -> Self {
        let code = match err {
            AnalysisError::UnknownPreset { .. } => ErrorCode::UnknownPreset,
            AnalysisError::InvalidPreset { .. } | AnalysisError::Parse(_) => {
                ErrorCode::InvalidPreset
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<DiffError> for TallyError {
    fn from(err: DiffError) -> Self {
        let code = match err {
            DiffError::OutOfRange { .. } => ErrorCode::InvalidReceipt,
            DiffError::NotDiffable(_) | DiffError::IncompatibleReceipts { .. } => {
                ErrorCode::IncompatibleReceipts
            }
        };
        Self::new(code, err.to_string())
    }
}

/// JSON error response: `{"error": true, "code", "message", "details"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `true` for error responses.
    pub error: bool,
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<TallyError> for ErrorEnvelope {
    fn from(err: TallyError) -> Self {
        Self {
            error: true,
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

impl ErrorEnvelope {
    /// Convert to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":true,"code":"{}","message":"{}"}}"#,
                self.code, self.message
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_to_snake_case() {
        let err = TallyError::path_not_found("/some/path");
        let json = err.to_json();
        assert!(json.contains("\"code\":\"path_not_found\""));
    }

    #[test]
    fn envelope_has_error_true() {
        let env: ErrorEnvelope = TallyError::invalid_mode("foo").into();
        assert!(env.error);
        assert_eq!(env.code, ErrorCode::InvalidMode);
        let v: serde_json::Value = serde_json::from_str(&env.to_json()).unwrap();
        assert_eq!(v["error"], true);
        assert_eq!(v["code"], "invalid_mode");
    }

    #[test]
    fn display_includes_code() {
        let err = TallyError::new(ErrorCode::ScanError, "test message");
        let display = err.to_string();
        assert!(display.contains("[scan_error]"));
        assert!(display.contains("test message"));
    }

    #[test]
    fn codes_map_to_families() {
        assert_eq!(ErrorCode::InvalidJson.kind(), ErrorKind::Input);
        assert_eq!(ErrorCode::UnknownPreset.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::InvalidReceipt.kind(), ErrorKind::Source);
        assert_eq!(ErrorCode::InternalError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn display_matches_serde_name() {
        for code in [
            ErrorCode::InvalidJson,
            ErrorCode::InvalidMode,
            ErrorCode::InvalidSettings,
            ErrorCode::UnknownPreset,
            ErrorCode::InvalidPreset,
            ErrorCode::IncompatibleReceipts,
            ErrorCode::PathNotFound,
            ErrorCode::ScanError,
            ErrorCode::IoError,
            ErrorCode::InvalidReceipt,
            ErrorCode::InternalError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }

    #[test]
    fn component_errors_convert() {
        let scan: TallyError = ScanError::PathNotFound("x".into()).into();
        assert_eq!(scan.code, ErrorCode::PathNotFound);

        let settings: TallyError = SettingsError::NotPositive { field: "top" }.into();
        assert_eq!(settings.code, ErrorCode::InvalidSettings);
        assert!(settings.message.contains("top"));

        let preset: TallyError = AnalysisError::UnknownPreset {
            name: "nope".into(),
            available: "receipt".into(),
        }
        .into();
        assert_eq!(preset.code, ErrorCode::UnknownPreset);

        let scan_failure: TallyError = ScanError::Scan("walk interrupted".into()).into();
        assert_eq!(scan_failure.code, ErrorCode::ScanError);
        assert_eq!(scan_failure.kind(), ErrorKind::Source);
    }

    #[test]
    fn diff_errors_split_by_cause() {
        let range: TallyError = DiffError::OutOfRange { key: "Rust".into() }.into();
        assert_eq!(range.code, ErrorCode::InvalidReceipt);
        assert!(range.message.contains("Rust"));

        let kinds: TallyError = DiffError::NotDiffable(tally_types::Mode::Export).into();
        assert_eq!(kinds.code, ErrorCode::IncompatibleReceipts);
    }
}
