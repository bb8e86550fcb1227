//! Error types for classforge
//!
//! Lookups never fail: a missing declaration is `None`, an unlinkable
//! signature component is a placeholder `TypeRef`. The variants below are the
//! contract violations that surface to the immediate caller.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// classforge errors
#[derive(Error, Debug)]
pub enum Error {
    /// Registry-time contract violation (e.g. duplicate version marker)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An API-aware generator was rendered without an Environment
    #[error("An environment is required to render {0}")]
    ContextRequired(String),

    #[error("Metadata type mismatch on element '{element}': expected {expected}, found {found}")]
    MetadataTypeMismatch {
        element: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("No variant of API '{spec}' applies to version {version}")]
    UnresolvableApi { spec: String, version: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Code parse error: {0}")]
    CodeParse(String),

    #[error("Signature parse error: {0}")]
    Signature(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::Render(e.to_string())
    }
}
