//! Import resolution errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors while walking a tree for imports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Malformed {construct}: {reason}")]
    Structural {
        construct: &'static str,
        reason: String,
    },
}

/// Errors while loading an import registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Registry does not name a database import")]
    MissingDatabase,

    #[error("Registry entry `{0}` has an empty fully-qualified name")]
    EmptyEntry(String),

    #[error("Registry entries `{first}` and `{second}` differ only in case")]
    CaseCollision { first: String, second: String },
}
