use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("unknown preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },

    #[error("invalid preset '{preset}': {reason}")]
    InvalidPreset { preset: String, reason: String },

    #[error("failed to parse preset definitions: {0}")]
    Parse(String),
}

impl AnalysisError {
    pub(crate) fn invalid(preset: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPreset {
            preset: preset.to_string(),
            reason: reason.into(),
        }
    }
}
