//! Error types shared by the loader, writer and run configuration.
//!
//! Music-theory failures (unspellable intervals, out-of-range alterations)
//! live next to the code that produces them in `pitch` and `interval`; they
//! are always handled locally and never abort a document pass.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a whole run: the document cannot be read, written
/// or configured.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 in MusicXML file: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unsupported root element: '{0}'. Only 'score-partwise' is supported.")]
    UnsupportedRoot(String),

    #[error("MXL archive error: {0}")]
    Archive(String),

    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("YAML configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON report error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An unknown name in a comma list (interval, accidental tag, triad kind).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseNameError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl From<ParseNameError> for ScoreError {
    fn from(e: ParseNameError) -> Self {
        ScoreError::Config(e.to_string())
    }
}
