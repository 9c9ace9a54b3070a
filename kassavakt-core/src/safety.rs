//! ## kassavakt-core::safety
//! **Safety check over a borrowed allocation state**
//!
//! Repeatedly sweeps the unfinished processes in index order. A process whose
//! remaining need fits in the simulated free pool (`work`) is assumed to run
//! to completion and release everything it holds. The sweep stops once every
//! process has finished or a full pass finishes nobody.
//!
//! Inputs are only read; the report owns its sequence.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::resources::{need_matrix, ProcessId, ResourceMatrix, ResourceVector, SafeSequence};

/// Result of one safety check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Every process could finish.
    pub safe: bool,
    /// Completion order found. Covers all processes only when `safe`.
    pub sequence: SafeSequence,
    /// Number of sweeps performed, never more than the number of processes.
    pub passes: usize,
}

/// Decides whether a completion order exists for every process.
///
/// `max` and `allocation` must have the same number of rows and every row
/// must have `available.len()` columns. `allocation <= max` is assumed; the
/// answer is meaningless otherwise.
pub fn check_safety(
    max: &ResourceMatrix,
    allocation: &ResourceMatrix,
    available: &ResourceVector,
) -> SafetyReport {
    let need = need_matrix(max, allocation);
    let processes = need.rows();

    let mut work = available.clone();
    let mut finished = vec![false; processes];
    let mut sequence = SafeSequence::default();
    let mut passes = 0;

    while sequence.len() < processes {
        passes += 1;
        let mut progress = false;

        for process in 0..processes {
            if finished[process] || !need[process].fits_within(&work) {
                continue;
            }
            // Needs never exceed Units::MAX, so clamping keeps the comparison exact.
            work.saturating_add_assign(&allocation[process]);
            finished[process] = true;
            sequence.push(ProcessId(process));
            progress = true;
            debug!(process, work = %work, "process can finish");
        }

        trace!(pass = passes, finished = sequence.len(), "safety pass complete");
        if !progress {
            break;
        }
    }

    SafetyReport {
        safe: sequence.len() == processes,
        sequence,
        passes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use crate::resources::Units;

    fn textbook() -> (ResourceMatrix, ResourceMatrix, ResourceVector) {
        (
            [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]].into(),
            [[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]].into(),
            [3, 3, 2].into(),
        )
    }

    #[test]
    fn test_textbook_state_is_safe() {
        let (max, allocation, available) = textbook();
        let report = check_safety(&max, &allocation, &available);
        assert!(report.safe);
        assert_eq!(report.sequence.indices(), vec![1, 3, 4, 0, 2]);
        assert_eq!(report.sequence.to_string(), "P1 -> P3 -> P4 -> P0 -> P2");
        assert!(report.passes <= 5);
    }

    #[test]
    fn test_unsafe_state_returns_partial_sequence() {
        let (max, allocation, _) = textbook();
        let report = check_safety(&max, &allocation, &[0, 0, 0].into());
        assert!(!report.safe);
        assert!(report.sequence.is_empty());
        assert_eq!(report.passes, 1);

        // P3 and then P1 can finish, the rest starve.
        let report = check_safety(&max, &allocation, &[0, 1, 1].into());
        assert!(!report.safe);
        assert_eq!(report.sequence.indices(), vec![3, 1]);
    }

    #[test]
    fn test_check_is_deterministic() {
        let (max, allocation, available) = textbook();
        let first = check_safety(&max, &allocation, &available);
        let second = check_safety(&max, &allocation, &available);
        assert_eq!(first, second);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let (max, allocation, available) = textbook();
        let before = (max.clone(), allocation.clone(), available.clone());
        check_safety(&max, &allocation, &available);
        assert_eq!((max, allocation, available), before);
    }

    #[test]
    fn test_no_processes_is_trivially_safe() {
        let report = check_safety(
            &ResourceMatrix::default(),
            &ResourceMatrix::default(),
            &[1, 2].into(),
        );
        assert!(report.safe);
        assert!(report.sequence.is_empty());
        assert_eq!(report.passes, 0);
    }

    #[test]
    fn test_late_process_finishes_on_later_pass() {
        // P0 only fits once P1 released its unit, which takes a second pass.
        let max: ResourceMatrix = [[3], [2], [1]].into();
        let allocation: ResourceMatrix = [[1], [1], [0]].into();
        let report = check_safety(&max, &allocation, &[1].into());
        assert!(report.safe);
        assert_eq!(report.sequence.indices(), vec![1, 2, 0]);
        assert_eq!(report.passes, 2);
    }

    #[test]
    fn test_work_saturates_instead_of_overflowing() {
        let report = check_safety(&[[1]].into(), &[[1]].into(), &[Units::MAX].into());
        assert!(report.safe);
        assert_eq!(report.sequence.indices(), vec![0]);

        let max: ResourceMatrix = [[Units::MAX], [Units::MAX], [3]].into();
        let allocation: ResourceMatrix = [[Units::MAX - 1], [5], [0]].into();
        let report = check_safety(&max, &allocation, &[4].into());
        assert!(report.safe);
        assert_eq!(report.sequence.indices(), vec![0, 1, 2]);
    }

    #[traced_test]
    #[test]
    fn test_logs_finished_processes() {
        let (max, allocation, available) = textbook();
        check_safety(&max, &allocation, &available);
        assert!(logs_contain("process can finish"));
    }
}
