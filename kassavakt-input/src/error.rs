//! Error types for loading a state from text

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use kassavakt_core::StateError;

/// Logical record of the input format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record {
    Header,
    Available,
    Max(usize),
    Allocation(usize),
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Header => write!(f, "header"),
            Record::Available => write!(f, "Available"),
            Record::Max(row) => write!(f, "Max row {row}"),
            Record::Allocation(row) => write!(f, "Allocation row {row}"),
        }
    }
}

/// Fatal input errors. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot open input file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: '{token}' is not a non-negative integer")]
    InvalidInteger { line: usize, token: String },

    #[error("{record} (line {line}): expected {expected} integers, got {actual}")]
    Arity {
        record: Record,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Input ended before {record}")]
    MissingRecord { record: Record },

    #[error("Line {line}: unexpected data after the last Allocation row")]
    TrailingRecord { line: usize },

    #[error("Line {line}: number of processes and resource types must be at least 1")]
    EmptyDimension { line: usize },

    #[error("Inconsistent state: {0}")]
    State(#[from] StateError),
}
