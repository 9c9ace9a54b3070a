//! ## kassavakt-core::shared
//! **Lock-guarded state for multi-threaded callers**
//!
//! A request's gate, tentative commit, safety check and rollback all run
//! while the lock is held, so no other caller can observe a tentative
//! allocation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::request::{Outcome, RequestError};
use crate::resources::{ResourceVector, SystemState};
use crate::safety::SafetyReport;

/// Cheaply cloneable handle to one session's state.
#[derive(Clone, Debug)]
pub struct SharedState {
    inner: Arc<Mutex<SystemState>>,
}

impl SharedState {
    pub fn new(state: SystemState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Evaluates one request as a single critical section.
    pub fn evaluate_request(
        &self,
        process: usize,
        request: &ResourceVector,
    ) -> Result<Outcome, RequestError> {
        self.inner.lock().evaluate_request(process, request)
    }

    pub fn check_safety(&self) -> SafetyReport {
        self.inner.lock().check_safety()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SystemState {
        self.inner.lock().clone()
    }
}

impl From<SystemState> for SharedState {
    fn from(state: SystemState) -> Self {
        Self::new(state)
    }
}
