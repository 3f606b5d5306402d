// src/error.rs
//! Error taxonomy.
//!
//! Resource-level failures ([`FetchError`], [`AssembleError`]) are recovered
//! by the scrape loop: the item is skipped and logged. Everything else
//! ([`Error`]) is structural and stops the run before anything is committed.

use std::path::PathBuf;

use thiserror::Error;

/// One remote resource could not be obtained. Never cached.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body arrived but is not the shape the source expects.
    #[error("malformed payload from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl FetchError {
    pub fn malformed(url: &str, reason: impl ToString) -> Self {
        FetchError::Malformed { url: s!(url), reason: reason.to_string() }
    }
}

/// One fight could not be flattened into a row.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("unrecognised corner tag `{0}`")]
    BadCorner(String),

    #[error("corner {0} appears {1} times (expected once)")]
    CornerCount(&'static str, usize),

    #[error("fight {0} is not listed in its event feed")]
    FightNotInEvent(String),

    #[error("column `{0}` is not part of the schema")]
    UnknownColumn(String),

    #[error("column `{0}` was never set")]
    UnsetColumn(&'static str),

    #[error("payload does not match expected shape: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Batch columns differ from the historical dataset's columns.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("schema mismatch: missing {missing:?}, unexpected {unexpected:?}, duplicated {duplicated:?}")]
pub struct SchemaMismatch {
    /// In the historical dataset but not in the batch.
    pub missing: Vec<String>,
    /// In the batch but not in the historical dataset.
    pub unexpected: Vec<String>,
    /// Appears more than once in either header.
    pub duplicated: Vec<String>,
}

/// Structural failure. Aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed dataset {}: {reason}", path.display())]
    Dataset { path: PathBuf, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    #[error("could not list events: {0}")]
    Index(#[source] FetchError),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
