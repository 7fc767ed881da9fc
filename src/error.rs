// Errors raised above the document layer: page scripting, fixtures, output
use std::path::PathBuf;
use thiserror::Error;

use crate::dom::DomError;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("No element with id '{0}'")]
    ElementNotFound(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported fixture format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

pub type PageResult<T> = Result<T, PageError>;
