//! ## kassavakt-core::resources
//! **Resource vectors, matrices and the owned system state**
//!
//! A `ResourceVector` holds one count per resource type, a `ResourceMatrix`
//! holds one vector per process. `SystemState` owns Max, Allocation and
//! Available for the lifetime of a session and is the only place where the
//! dimensions `n` (processes) and `m` (resource types) are fixed.

use std::fmt;
use std::ops::{AddAssign, Index, SubAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{evaluate_request, Outcome, RequestError};
use crate::safety::{check_safety, SafetyReport};

/// Count of units of one resource type.
pub type Units = u32;

/// Errors raised when assembling a `SystemState` from raw matrices.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Max has {max} rows but Allocation has {allocation}")]
    RowCountMismatch { max: usize, allocation: usize },

    #[error("{matrix} row {row} has {actual} resource types, expected {expected}")]
    WidthMismatch {
        matrix: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Allocation[{process}][{resource}] = {allocated} exceeds Max[{process}][{resource}] = {max}"
    )]
    AllocationExceedsMax {
        process: usize,
        resource: usize,
        allocated: Units,
        max: Units,
    },

    #[error("Total units of resource type {resource} overflow")]
    Overflow { resource: usize },
}

/// One count per resource type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Vec<Units>);

impl ResourceVector {
    pub fn new(units: Vec<Units>) -> Self {
        Self(units)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, resource: usize) -> Option<Units> {
        self.0.get(resource).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Units> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Units] {
        &self.0
    }

    /// True when every component is `<=` the matching component of `other`.
    #[inline]
    pub fn fits_within(&self, other: &ResourceVector) -> bool {
        self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }

    /// Index of the first component that is larger than in `other`.
    pub fn first_excess(&self, other: &ResourceVector) -> Option<usize> {
        self.0.iter().zip(&other.0).position(|(a, b)| a > b)
    }

    /// Elementwise difference clamped at zero.
    pub fn saturating_sub(&self, other: &ResourceVector) -> ResourceVector {
        Self(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| a.saturating_sub(*b))
                .collect(),
        )
    }

    /// Elementwise sum, `None` if any component overflows.
    pub fn checked_add(&self, other: &ResourceVector) -> Option<ResourceVector> {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_add(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// In-place elementwise sum clamped at `Units::MAX`.
    pub fn saturating_add_assign(&mut self, other: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a = a.saturating_add(*b);
        }
    }
}

impl From<Vec<Units>> for ResourceVector {
    fn from(units: Vec<Units>) -> Self {
        Self(units)
    }
}

impl<const M: usize> From<[Units; M]> for ResourceVector {
    fn from(units: [Units; M]) -> Self {
        Self(units.to_vec())
    }
}

impl Index<usize> for ResourceVector {
    type Output = Units;

    fn index(&self, resource: usize) -> &Units {
        &self.0[resource]
    }
}

impl AddAssign<&ResourceVector> for ResourceVector {
    fn add_assign(&mut self, rhs: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(&rhs.0) {
            *a += *b;
        }
    }
}

impl SubAssign<&ResourceVector> for ResourceVector {
    fn sub_assign(&mut self, rhs: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(&rhs.0) {
            *a -= *b;
        }
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (j, units) in self.0.iter().enumerate() {
            if j > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{units}")?;
        }
        write!(f, ")")
    }
}

/// One `ResourceVector` per process, all of the same width.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMatrix(Vec<ResourceVector>);

impl ResourceMatrix {
    pub fn new(rows: Vec<ResourceVector>) -> Self {
        Self(rows)
    }

    pub fn zeros(rows: usize, width: usize) -> Self {
        Self(vec![ResourceVector::zeros(width); rows])
    }

    /// Number of processes.
    pub fn rows(&self) -> usize {
        self.0.len()
    }

    /// Number of resource types, taken from the first row. Zero when empty.
    pub fn width(&self) -> usize {
        self.0.first().map_or(0, ResourceVector::len)
    }

    pub fn row(&self, process: usize) -> Option<&ResourceVector> {
        self.0.get(process)
    }

    pub fn row_mut(&mut self, process: usize) -> Option<&mut ResourceVector> {
        self.0.get_mut(process)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceVector> {
        self.0.iter()
    }

    /// Per-type sum over all rows, clamped at `Units::MAX`.
    pub fn column_totals(&self) -> ResourceVector {
        let mut totals = ResourceVector::zeros(self.width());
        for row in self.iter() {
            totals.saturating_add_assign(row);
        }
        totals
    }
}

impl From<Vec<ResourceVector>> for ResourceMatrix {
    fn from(rows: Vec<ResourceVector>) -> Self {
        Self(rows)
    }
}

impl<const N: usize, const M: usize> From<[[Units; M]; N]> for ResourceMatrix {
    fn from(rows: [[Units; M]; N]) -> Self {
        Self(rows.into_iter().map(ResourceVector::from).collect())
    }
}

impl Index<usize> for ResourceMatrix {
    type Output = ResourceVector;

    fn index(&self, process: usize) -> &ResourceVector {
        &self.0[process]
    }
}

/// Derives `Need = Max - Allocation` for every process.
///
/// `Max >= Allocation` is a precondition; violating components clamp to zero.
pub fn need_matrix(max: &ResourceMatrix, allocation: &ResourceMatrix) -> ResourceMatrix {
    ResourceMatrix(
        max.iter()
            .zip(allocation.iter())
            .map(|(max_row, alloc_row)| max_row.saturating_sub(alloc_row))
            .collect(),
    )
}

/// Process identifier, rendered as `P{id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Completion order produced by a safety check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeSequence(Vec<ProcessId>);

impl SafeSequence {
    pub fn new(order: Vec<ProcessId>) -> Self {
        Self(order)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw process indices in completion order.
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|p| p.0).collect()
    }

    pub(crate) fn push(&mut self, process: ProcessId) {
        self.0.push(process);
    }
}

impl fmt::Display for SafeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, process) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{process}")?;
        }
        Ok(())
    }
}

/// Max, Allocation and Available for one session.
///
/// Construction checks dimensions and `Allocation <= Max`; after that the
/// number of processes and resource types never changes. Allocation and
/// Available are only mutated through the request evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemState {
    pub(crate) max: ResourceMatrix,
    pub(crate) allocation: ResourceMatrix,
    pub(crate) available: ResourceVector,
}

impl SystemState {
    pub fn new(
        max: ResourceMatrix,
        allocation: ResourceMatrix,
        available: ResourceVector,
    ) -> Result<Self, StateError> {
        if max.rows() != allocation.rows() {
            return Err(StateError::RowCountMismatch {
                max: max.rows(),
                allocation: allocation.rows(),
            });
        }

        let width = available.len();
        for (name, matrix) in [("Max", &max), ("Allocation", &allocation)] {
            if let Some((row, vector)) = matrix.iter().enumerate().find(|(_, v)| v.len() != width)
            {
                return Err(StateError::WidthMismatch {
                    matrix: name,
                    row,
                    expected: width,
                    actual: vector.len(),
                });
            }
        }

        for (process, (max_row, alloc_row)) in max.iter().zip(allocation.iter()).enumerate() {
            if let Some(resource) = alloc_row.first_excess(max_row) {
                return Err(StateError::AllocationExceedsMax {
                    process,
                    resource,
                    allocated: alloc_row[resource],
                    max: max_row[resource],
                });
            }
        }

        // Totals must fit so that Work in the safety check can never overflow.
        for resource in 0..width {
            let total = allocation
                .iter()
                .try_fold(available[resource], |acc, row| acc.checked_add(row[resource]));
            if total.is_none() {
                return Err(StateError::Overflow { resource });
            }
        }

        Ok(Self {
            max,
            allocation,
            available,
        })
    }

    /// Number of processes (`n`).
    pub fn processes(&self) -> usize {
        self.max.rows()
    }

    /// Number of resource types (`m`).
    pub fn resource_types(&self) -> usize {
        self.available.len()
    }

    pub fn max(&self) -> &ResourceMatrix {
        &self.max
    }

    pub fn allocation(&self) -> &ResourceMatrix {
        &self.allocation
    }

    pub fn available(&self) -> &ResourceVector {
        &self.available
    }

    /// Remaining need of one process.
    pub fn need(&self, process: usize) -> Option<ResourceVector> {
        let max_row = self.max.row(process)?;
        let alloc_row = self.allocation.row(process)?;
        Some(max_row.saturating_sub(alloc_row))
    }

    pub fn need_matrix(&self) -> ResourceMatrix {
        need_matrix(&self.max, &self.allocation)
    }

    /// Runs the safety check on the current state.
    pub fn check_safety(&self) -> SafetyReport {
        check_safety(&self.max, &self.allocation, &self.available)
    }

    /// Evaluates one request, committing it only when it is granted.
    pub fn evaluate_request(
        &mut self,
        process: usize,
        request: &ResourceVector,
    ) -> Result<Outcome, RequestError> {
        evaluate_request(
            &self.max,
            &mut self.allocation,
            &mut self.available,
            process,
            request,
        )
    }

    /// Installed quantity per resource type: allocated plus available.
    pub fn totals(&self) -> ResourceVector {
        let mut totals = self.available.clone();
        totals.saturating_add_assign(&self.allocation.column_totals());
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook() -> SystemState {
        SystemState::new(
            [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]].into(),
            [[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]].into(),
            [3, 3, 2].into(),
        )
        .unwrap()
    }

    #[test]
    fn test_need_is_max_minus_allocation() {
        let state = textbook();
        assert_eq!(state.need(0), Some(ResourceVector::from([7, 4, 3])));
        assert_eq!(state.need(1), Some(ResourceVector::from([1, 2, 2])));
        assert_eq!(state.need(5), None);
        assert_eq!(state.need_matrix()[4], ResourceVector::from([4, 3, 1]));
    }

    #[test]
    fn test_state_request_conserves_totals() {
        let mut state = textbook();
        let totals = state.totals();
        let outcome = state
            .evaluate_request(1, &ResourceVector::from([1, 0, 2]))
            .unwrap();
        assert!(outcome.is_granted());
        assert_eq!(state.totals(), totals);
        assert!(state.check_safety().safe);
    }

    #[test]
    fn test_totals() {
        assert_eq!(textbook().totals(), ResourceVector::from([10, 5, 7]));
    }

    #[test]
    fn test_dimensions() {
        let state = textbook();
        assert_eq!(state.processes(), 5);
        assert_eq!(state.resource_types(), 3);
    }

    #[test]
    fn test_rejects_allocation_above_max() {
        let err = SystemState::new([[1, 1]].into(), [[1, 2]].into(), [0, 0].into()).unwrap_err();
        assert_eq!(
            err,
            StateError::AllocationExceedsMax {
                process: 0,
                resource: 1,
                allocated: 2,
                max: 1,
            }
        );
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let max = ResourceMatrix::new(vec![[1, 1].into(), [1].into()]);
        let err = SystemState::new(max, ResourceMatrix::zeros(2, 2), [0, 0].into()).unwrap_err();
        assert!(matches!(
            err,
            StateError::WidthMismatch {
                matrix: "Max",
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let err = SystemState::new(
            ResourceMatrix::zeros(2, 1),
            ResourceMatrix::zeros(3, 1),
            [0].into(),
        )
        .unwrap_err();
        assert_eq!(err, StateError::RowCountMismatch { max: 2, allocation: 3 });
    }

    #[test]
    fn test_rejects_total_overflow() {
        let err = SystemState::new(
            [[Units::MAX]].into(),
            [[Units::MAX]].into(),
            [1].into(),
        )
        .unwrap_err();
        assert_eq!(err, StateError::Overflow { resource: 0 });
    }

    #[test]
    fn test_vector_helpers() {
        let a = ResourceVector::from([1, 2, 3]);
        let b = ResourceVector::from([1, 3, 2]);
        assert!(!a.fits_within(&b));
        assert_eq!(a.first_excess(&b), Some(2));
        assert_eq!(b.saturating_sub(&a), ResourceVector::from([0, 1, 0]));
        assert_eq!(a.checked_add(&b), Some(ResourceVector::from([2, 5, 5])));
        let full = ResourceVector::from([Units::MAX]);
        assert_eq!(full.checked_add(&ResourceVector::from([1])), None);
        assert_eq!(a.to_string(), "(1, 2, 3)");
        assert_eq!(a.get(1), Some(2));
        assert_eq!(a.get(3), None);
    }

    #[test]
    fn test_saturating_add_clamps() {
        let mut work = ResourceVector::from([Units::MAX, 1]);
        work.saturating_add_assign(&ResourceVector::from([5, 2]));
        assert_eq!(work, ResourceVector::from([Units::MAX, 3]));
    }

    #[test]
    fn test_matrix_width_and_column_totals() {
        let state = textbook();
        assert_eq!(state.max().width(), 3);
        assert_eq!(state.allocation().column_totals(), ResourceVector::from([7, 2, 5]));
        assert_eq!(ResourceMatrix::default().width(), 0);
        assert!(ResourceMatrix::default().column_totals().is_empty());
    }

    #[test]
    fn test_totals_without_processes() {
        let state = SystemState::new(
            ResourceMatrix::default(),
            ResourceMatrix::default(),
            [4, 2].into(),
        )
        .unwrap();
        assert_eq!(state.totals(), ResourceVector::from([4, 2]));
    }

    #[test]
    fn test_sequence_display() {
        let sequence = SafeSequence::new(vec![ProcessId(1), ProcessId(3), ProcessId(0)]);
        assert_eq!(sequence.to_string(), "P1 -> P3 -> P0");
        assert_eq!(SafeSequence::default().to_string(), "");
    }
}
