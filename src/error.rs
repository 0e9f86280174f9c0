// Error types for reading option banks and submitting them.
//
// Each stage of a run has its own error: configuration, opening the input,
// decoding a single row, and creating a bank on the remote API.

use std::path::PathBuf;
use thiserror::Error;

/// A mandatory startup value is missing or unusable.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Token and file path are required (missing {0})")]
    Missing(&'static str),

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to persist token to {path}: {source}")]
    PersistToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The input source could not be opened or read.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unable to open options CSV {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read options CSV: {0}")]
    Read(#[source] RowError),

    #[error("invalid row: {0}")]
    Row(#[from] RowError),
}

/// A single data row that could not be turned into an option, or the
/// underlying stream failing while that row was read.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("malformed CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("row on line {line} has {found} fields, expected at least 3")]
    Short { line: u64, found: usize },
}

/// Creating one option bank failed; the run halts here.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("failed to create option bank {bank}: {source}")]
    Transport {
        bank: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to create option bank {bank}: {status}")]
    Api {
        bank: String,
        status: u16,
        body: String,
    },
}

impl SubmitError {
    /// Name of the bank whose creation halted the run.
    pub fn bank(&self) -> &str {
        match self {
            SubmitError::Transport { bank, .. } | SubmitError::Api { bank, .. } => bank,
        }
    }

    /// Status code returned by the API, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Api { status, .. } => Some(*status),
            SubmitError::Transport { .. } => None,
        }
    }
}
