//! # kassavakt-input
//!
//! Loader for the plain-text state format:
//!
//! ```text
//! # n m
//! 5 3
//! 3 3 2          # Available
//! 7 5 3          # Max, one row per process
//! ...
//! 0 1 0          # Allocation, one row per process
//! ...
//! ```
//!
//! `#` starts a comment, blank lines are skipped and every remaining line is
//! one record of whitespace-separated non-negative integers.

mod error;
mod parser;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use kassavakt_core::{ResourceMatrix, ResourceVector, SystemState};

pub use error::{InputError, Record};
use parser::{records, Line};

/// Parses a complete state from text.
pub fn parse_state(input: &str) -> Result<SystemState, InputError> {
    let mut lines = records(input)?.into_iter();

    let header = expect(&mut lines, Record::Header, 2)?;
    let (processes, resource_types) = (header.values[0] as usize, header.values[1] as usize);
    if processes == 0 || resource_types == 0 {
        return Err(InputError::EmptyDimension {
            line: header.number,
        });
    }
    debug!(processes, resource_types, "parsed header");

    let available = expect(&mut lines, Record::Available, resource_types)?;
    let max = (0..processes)
        .map(|row| expect(&mut lines, Record::Max(row), resource_types))
        .collect::<Result<Vec<_>, _>>()?;
    let allocation = (0..processes)
        .map(|row| expect(&mut lines, Record::Allocation(row), resource_types))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(extra) = lines.next() {
        return Err(InputError::TrailingRecord { line: extra.number });
    }

    let state = SystemState::new(matrix(max), matrix(allocation), available.values.into())?;
    Ok(state)
}

/// Reads and parses a state file.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<SystemState, InputError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = parse_state(&content)?;
    info!(
        path = %path.display(),
        processes = state.processes(),
        resource_types = state.resource_types(),
        "loaded state"
    );
    Ok(state)
}

fn expect(
    lines: &mut impl Iterator<Item = Line>,
    record: Record,
    expected: usize,
) -> Result<Line, InputError> {
    let line = lines.next().ok_or(InputError::MissingRecord { record })?;
    if line.values.len() != expected {
        return Err(InputError::Arity {
            record,
            line: line.number,
            expected,
            actual: line.values.len(),
        });
    }
    Ok(line)
}

fn matrix(rows: Vec<Line>) -> ResourceMatrix {
    rows.into_iter()
        .map(|line| ResourceVector::from(line.values))
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassavakt_core::StateError;

    const TEXTBOOK: &str = "\
# textbook example
5 3
3 3 2   # available

7 5 3
3 2 2
9 0 2
2 2 2
4 3 3
# allocation
0 1 0
2 0 0
3 0 2
2 1 1
0 0 2
";

    #[test]
    fn test_parses_textbook_state() {
        let state = parse_state(TEXTBOOK).unwrap();
        assert_eq!(state.processes(), 5);
        assert_eq!(state.resource_types(), 3);
        assert_eq!(state.available(), &ResourceVector::from([3, 3, 2]));
        assert_eq!(state.max()[2], ResourceVector::from([9, 0, 2]));
        assert_eq!(state.allocation()[4], ResourceVector::from([0, 0, 2]));
        assert_eq!(state.check_safety().sequence.indices(), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_short_max_row_names_row_and_count() {
        let input = TEXTBOOK.replace("9 0 2", "9 0");
        let err = parse_state(&input).unwrap_err();
        assert!(matches!(
            err,
            InputError::Arity {
                record: Record::Max(2),
                line: 7,
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(
            err.to_string(),
            "Max row 2 (line 7): expected 3 integers, got 2"
        );
    }

    #[test]
    fn test_long_allocation_row() {
        let input = TEXTBOOK.replace("2 1 1", "2 1 1 1");
        let err = parse_state(&input).unwrap_err();
        assert!(matches!(
            err,
            InputError::Arity {
                record: Record::Allocation(3),
                expected: 3,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_header() {
        let err = parse_state("5\n").unwrap_err();
        assert!(matches!(
            err,
            InputError::Arity {
                record: Record::Header,
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_rows() {
        let err = parse_state("2 1\n1\n1\n1\n0\n").unwrap_err();
        assert!(matches!(
            err,
            InputError::MissingRecord {
                record: Record::Allocation(1)
            }
        ));
        assert!(matches!(
            parse_state("").unwrap_err(),
            InputError::MissingRecord {
                record: Record::Header
            }
        ));
    }

    #[test]
    fn test_trailing_record() {
        let input = format!("{TEXTBOOK}1 1 1\n");
        assert!(matches!(
            parse_state(&input).unwrap_err(),
            InputError::TrailingRecord { line: 16 }
        ));
    }

    #[test]
    fn test_zero_dimension() {
        assert!(matches!(
            parse_state("0 3\n").unwrap_err(),
            InputError::EmptyDimension { line: 1 }
        ));
    }

    #[test]
    fn test_allocation_above_max_is_rejected() {
        let err = parse_state("1 1\n0\n1\n2\n").unwrap_err();
        assert!(matches!(
            err,
            InputError::State(StateError::AllocationExceedsMax { process: 0, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_state("/nonexistent/kassavakt/state.txt").unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
