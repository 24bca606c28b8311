//! Error type shared by the loading, inference, and query layers.
//!
//! Every failure is fail-fast: nothing here is retried, and a failed load
//! leaves the target table partially populated. Callers are expected to drop
//! the whole [`crate::query::Session`] after any error other than
//! [`Error::Engine`] raised while running a query.

use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("CSV file contains duplicate column name '{0}'")]
    DuplicateColumnName(String),

    #[error("CSV file has no header row")]
    MissingHeader,

    #[error("header and data row on line {line} have different number of columns ({expected} vs {found})")]
    RowLengthMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("could not guess data type for column '{column}' from {samples} sampled value(s)")]
    NoMatchingType { column: String, samples: usize },

    #[error(
        "failed to convert {value:?} in column '{column}' (line {line}) to {datatype}, \
         try increasing --sample-rows to improve type guesses"
    )]
    TypeConversionFailure {
        column: String,
        line: u64,
        value: String,
        datatype: &'static str,
    },

    #[error("not a valid '{encoding}' sequence in column '{column}' (line {line}): {bytes:?}")]
    InvalidEncoding {
        column: String,
        line: u64,
        encoding: &'static str,
        bytes: Vec<u8>,
    },

    #[error("load of table '{0}' already failed; start a new session")]
    LoadAborted(String),

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),

    /// Schema or query failure reported by the embedded engine, message untouched.
    #[error("{0}")]
    Engine(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Engine(err.to_string())
    }
}

impl Error {
    pub fn is_engine(&self) -> bool {
        matches!(self, Error::Engine(_))
    }
}
