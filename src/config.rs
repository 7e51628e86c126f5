//! Annotator configuration.
//!
//! Hosts usually hand over a JSON object with many more options than the
//! annotator reads; unknown keys are ignored and missing ones take defaults.

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;
use crate::selectors::FragmentUnit;

/// Options recognized by the annotator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotatorConfig {
    /// Never open the built-in editor; the host supplies its own UI
    pub headless: bool,

    /// Open every annotation read-only
    pub read_only: bool,

    /// Unit renderers use when writing drawn geometry into selectors
    pub fragment_unit: FragmentUnit,
}

impl AnnotatorConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set global read-only mode.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the selector unit.
    pub fn fragment_unit(mut self, unit: FragmentUnit) -> Self {
        self.fragment_unit = unit;
        self
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, AnnotatorError> {
        let config: Self = serde_json::from_str(json)?;
        log::debug!("Loaded annotator config: {:?}", config);
        Ok(config)
    }

    /// Serialize this configuration as JSON.
    pub fn to_json(&self) -> Result<String, AnnotatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnnotatorConfig::default();
        assert!(!config.headless);
        assert!(!config.read_only);
        assert_eq!(config.fragment_unit, FragmentUnit::Pixel);
    }

    #[test]
    fn test_from_json_ignores_unknown_and_fills_missing() {
        let config = AnnotatorConfig::from_json(
            r#"{ "readOnly": true, "fragmentUnit": "Percent", "locale": "auto", "widgets": [] }"#,
        )
        .unwrap();

        assert!(config.read_only);
        assert!(!config.headless);
        assert_eq!(config.fragment_unit, FragmentUnit::Percent);
    }

    #[test]
    fn test_unknown_unit_is_pixel() {
        let config = AnnotatorConfig::from_json(r#"{ "fragmentUnit": "em" }"#).unwrap();
        assert_eq!(config.fragment_unit, FragmentUnit::Pixel);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let err = AnnotatorConfig::from_json(r#"{ "headless": "yes" }"#).unwrap_err();
        assert!(matches!(err, AnnotatorError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AnnotatorConfig::new()
            .headless(true)
            .fragment_unit(FragmentUnit::Percent);
        let json = config.to_json().unwrap();
        assert!(json.contains(r#""fragmentUnit": "percent""#));
        assert_eq!(AnnotatorConfig::from_json(&json).unwrap(), config);
    }
}
