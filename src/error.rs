//! Application-wide error types.
//!
//! Every stage of the binding pipeline fails with one variant of [`Error`].
//! All of them are fatal to a run: the pipeline makes no attempt at partial
//! success, and re-running the tool is the recovery path (renaming is
//! idempotent).
//!
//! Library modules return [`Result`]; `main` wraps the final error in
//! `anyhow` for reporting.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a track ordinal could not be recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("no number found in {0}")]
    NoIndexFound(String),

    #[error("number in {0} is too large to be a track index")]
    IndexOverflow(String),
}

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid required input
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source directory could not be listed
    #[error("Discovery error in {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// A file name carries no recoverable ordinal
    #[error("Index parse error: {0}")]
    IndexParse(#[from] IndexError),

    /// Filesystem rename failed
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Duration probe failed or returned unusable data
    #[error("Probe error for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// Tag read/write/persist failed
    #[error("Tag error for {path}: {message}")]
    Tag { path: PathBuf, message: String },

    /// Chapter-metadata artifact could not be written
    #[error("Failed to write chapter metadata {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External encoder failed; carries its diagnostic output verbatim
    #[error("Encoder failed ({status}):\n{stderr}")]
    Encode { status: String, stderr: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a discovery error.
    pub fn discovery(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Discovery {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a probe error.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a tag error.
    pub fn tag(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Tag {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an artifact error.
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }
}
