use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{AnalysisError, Preset, builtin};

/// Presets by name.
///
/// Registration validates, so every preset in a registry can be evaluated.
/// Registering an existing name replaces the earlier preset.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, Preset>,
}

/// Shape of a TOML preset file: one `[[preset]]` table per preset.
#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default, rename = "preset")]
    presets: Vec<Preset>,
}

impl PresetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `receipt`, `health`, `risk` and `supply`.
    pub fn builtin() -> Self {
        let presets = builtin::presets()
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        Self { presets }
    }

    pub fn register(&mut self, preset: Preset) -> Result<(), AnalysisError> {
        preset.validate()?;
        self.presets.insert(preset.name.clone(), preset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Preset, AnalysisError> {
        self.presets
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownPreset {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// A registry containing only the presets defined in `input`.
    pub fn from_toml_str(input: &str) -> Result<Self, AnalysisError> {
        let mut registry = Self::new();
        registry.extend_from_toml(input)?;
        Ok(registry)
    }

    /// Register every preset defined in `input`. Nothing is registered if any
    /// preset fails to parse or validate.
    pub fn extend_from_toml(&mut self, input: &str) -> Result<Vec<String>, AnalysisError> {
        let file: PresetFile =
            toml::from_str(input).map_err(|e| AnalysisError::Parse(e.to_string()))?;
        self.extend(file.presets)
    }

    /// Register a batch of presets atomically; returns their names in order.
    pub fn extend(&mut self, presets: Vec<Preset>) -> Result<Vec<String>, AnalysisError> {
        for preset in &presets {
            preset.validate()?;
        }
        let names = presets.iter().map(|p| p.name.clone()).collect();
        for preset in presets {
            self.presets.insert(preset.name.clone(), preset);
        }
        Ok(names)
    }
}

/// Read presets from a JSON value: either an array of presets, or an object
/// mapping preset name to `{description?, metrics}`.
pub fn presets_from_json(value: &serde_json::Value) -> Result<Vec<Preset>, AnalysisError> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        description: String,
        metrics: Vec<crate::MetricDef>,
    }

    let parse = |e: serde_json::Error| AnalysisError::Parse(e.to_string());

    match value {
        serde_json::Value::Array(_) => {
            Vec::<Preset>::deserialize(value).map_err(parse)
        }
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(name, body)| {
                let body = Body::deserialize(body).map_err(parse)?;
                Ok(Preset {
                    name: name.clone(),
                    description: body.description,
                    metrics: body.metrics,
                })
            })
            .collect(),
        _ => Err(AnalysisError::Parse(
            "presets must be an array or an object".to_string(),
        )),
    }
}
