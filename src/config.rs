//! Environment and builder configuration
//!
//! Recognized keys: `lineDelimiter`, `parseMethodBodies`, `includeSources`.
//! Loadable from YAML or JSON; every key is optional.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by an Environment and the renders performed against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Line delimiter used by rendered source text
    #[serde(default = "default_line_delimiter")]
    pub line_delimiter: String,

    /// Keep method bodies as text spans (skipped when false)
    #[serde(default)]
    pub parse_method_bodies: bool,

    /// Consult source roots at all (binary-only when false)
    #[serde(default = "default_true")]
    pub include_sources: bool,
}

fn default_line_delimiter() -> String {
    "\n".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            line_delimiter: default_line_delimiter(),
            parse_method_bodies: false,
            include_sources: true,
        }
    }
}

impl EnvironmentConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EnvironmentConfig = serde_norway::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: EnvironmentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            other => Err(Error::Configuration(format!(
                "Unsupported config file extension: {:?}",
                other
            ))),
        }
    }

    /// JSON schema of the configuration document
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(EnvironmentConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    pub fn with_line_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.line_delimiter = delimiter.into();
        self
    }

    pub fn with_method_bodies(mut self, parse: bool) -> Self {
        self.parse_method_bodies = parse;
        self
    }

    pub fn with_sources(mut self, include: bool) -> Self {
        self.include_sources = include;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_delimiter.is_empty() {
            return Err(Error::Configuration(
                "lineDelimiter must not be empty".into(),
            ));
        }
        if self.line_delimiter.chars().any(|c| c != '\n' && c != '\r') {
            return Err(Error::Configuration(format!(
                "lineDelimiter must consist of CR/LF characters, got {:?}",
                self.line_delimiter
            )));
        }
        Ok(())
    }
}
