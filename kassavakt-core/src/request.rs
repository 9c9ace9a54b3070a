//! ## kassavakt-core::request
//! **Request evaluation with tentative commit and rollback**
//!
//! A request passes three gates in order: it must fit in the process's
//! remaining need, it must fit in what is available right now, and the state
//! after granting it must still be safe. The first two gates never touch the
//! state. The third commits tentatively and undoes the commit exactly when
//! the safety check fails.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::resources::{ResourceMatrix, ResourceVector, SafeSequence, Units};
use crate::safety::check_safety;

/// Answer to a request. Denials are regular outcomes, not errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Request committed; the state stays safe with this completion order.
    Granted(SafeSequence),
    /// The process asked for more than its declared maximum allows.
    DeniedExceedsNeed {
        resource: usize,
        requested: Units,
        need: Units,
    },
    /// Units are not free right now; the process has to wait.
    DeniedExceedsAvailable {
        resource: usize,
        requested: Units,
        available: Units,
    },
    /// Granting would leave no completion order; the commit was rolled back.
    DeniedUnsafe,
}

impl Outcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::Granted(_))
    }

    /// Stable label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Granted(_) => "granted",
            Outcome::DeniedExceedsNeed { .. } => "exceeds_need",
            Outcome::DeniedExceedsAvailable { .. } => "exceeds_available",
            Outcome::DeniedUnsafe => "unsafe",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Granted(sequence) => write!(f, "granted, safe sequence {sequence}"),
            Outcome::DeniedExceedsNeed {
                resource,
                requested,
                need,
            } => write!(
                f,
                "denied, resource {resource}: requested {requested} exceeds remaining need {need}"
            ),
            Outcome::DeniedExceedsAvailable {
                resource,
                requested,
                available,
            } => write!(
                f,
                "denied, resource {resource}: requested {requested} exceeds available {available}"
            ),
            Outcome::DeniedUnsafe => write!(f, "denied, state would be unsafe"),
        }
    }
}

/// Caller-side mistakes. Nothing is evaluated and nothing is mutated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Unknown process {process} (valid ids are 0..{processes})")]
    UnknownProcess { process: usize, processes: usize },

    #[error("Request has {actual} resource types, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Evaluates one request from `process` against the given state.
///
/// On `Granted` the allocation stays committed. Every other outcome, and every
/// error, leaves `allocation` and `available` exactly as they were.
#[instrument(skip(max, allocation, available, request), fields(request = %request))]
pub fn evaluate_request(
    max: &ResourceMatrix,
    allocation: &mut ResourceMatrix,
    available: &mut ResourceVector,
    process: usize,
    request: &ResourceVector,
) -> Result<Outcome, RequestError> {
    let processes = max.rows();
    let (Some(max_row), Some(held)) = (max.row(process), allocation.row(process)) else {
        return Err(RequestError::UnknownProcess { process, processes });
    };
    if request.len() != available.len() {
        return Err(RequestError::DimensionMismatch {
            expected: available.len(),
            actual: request.len(),
        });
    }

    let need = max_row.saturating_sub(held);
    if let Some(resource) = request.first_excess(&need) {
        debug!(resource, "request exceeds remaining need");
        return Ok(Outcome::DeniedExceedsNeed {
            resource,
            requested: request[resource],
            need: need[resource],
        });
    }
    if let Some(resource) = request.first_excess(available) {
        debug!(resource, "request exceeds available units");
        return Ok(Outcome::DeniedExceedsAvailable {
            resource,
            requested: request[resource],
            available: available[resource],
        });
    }

    commit(allocation, available, process, request);
    let report = check_safety(max, allocation, available);
    if report.safe {
        info!(sequence = %report.sequence, "request granted");
        return Ok(Outcome::Granted(report.sequence));
    }

    rollback(allocation, available, process, request);
    info!("request denied, state would be unsafe");
    Ok(Outcome::DeniedUnsafe)
}

fn commit(
    allocation: &mut ResourceMatrix,
    available: &mut ResourceVector,
    process: usize,
    request: &ResourceVector,
) {
    *available -= request;
    if let Some(row) = allocation.row_mut(process) {
        *row += request;
    }
}

fn rollback(
    allocation: &mut ResourceMatrix,
    available: &mut ResourceVector,
    process: usize,
    request: &ResourceVector,
) {
    *available += request;
    if let Some(row) = allocation.row_mut(process) {
        *row -= request;
    }
}
