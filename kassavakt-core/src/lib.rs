//! # kassavakt-core
//!
//! Deadlock avoidance for a fixed set of processes sharing reusable
//! resources: a safety check over Max/Allocation/Available and a request
//! evaluator that only grants requests keeping the state safe.
//!
//! ### Key Submodules:
//! - `resources`: vectors, matrices and the owned `SystemState`
//! - `safety`: safe-sequence search
//! - `request`: gated evaluation with tentative commit and rollback
//! - `shared`: mutex-guarded state for multi-threaded callers

pub mod request;
pub mod resources;
pub mod safety;
pub mod shared;

pub mod prelude {
    pub use crate::request::*;
    pub use crate::resources::*;
    pub use crate::safety::*;
    pub use crate::shared::*;
}

pub use request::{evaluate_request, Outcome, RequestError};
pub use resources::{
    ProcessId, ResourceMatrix, ResourceVector, SafeSequence, StateError, SystemState, Units,
};
pub use safety::{check_safety, SafetyReport};
pub use shared::SharedState;
