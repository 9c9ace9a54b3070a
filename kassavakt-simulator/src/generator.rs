//! Random consistent states for fuzzing.

use rand::Rng;

use kassavakt_config::FuzzConfig;
use kassavakt_core::{ResourceMatrix, ResourceVector, StateError, SystemState, Units};

/// Draws a state within the configured bounds with `Allocation <= Max`.
///
/// `config` must have passed validation; zero bounds make the ranges empty.
pub fn random_state<R: Rng>(rng: &mut R, config: &FuzzConfig) -> Result<SystemState, StateError> {
    let processes = rng.random_range(1..=config.max_processes);
    let width = rng.random_range(1..=config.max_resource_types);

    let mut max = Vec::with_capacity(processes);
    let mut allocation = Vec::with_capacity(processes);
    for _ in 0..processes {
        let max_row: Vec<Units> = (0..width)
            .map(|_| rng.random_range(0..=config.max_units))
            .collect();
        let alloc_row: Vec<Units> = max_row.iter().map(|&m| rng.random_range(0..=m)).collect();
        max.push(ResourceVector::from(max_row));
        allocation.push(ResourceVector::from(alloc_row));
    }
    let available: Vec<Units> = (0..width)
        .map(|_| rng.random_range(0..=config.max_units))
        .collect();

    SystemState::new(
        ResourceMatrix::from(max),
        ResourceMatrix::from(allocation),
        ResourceVector::from(available),
    )
}

/// Draws a request for `process` that sometimes overshoots its need by one.
pub fn random_request<R: Rng>(rng: &mut R, state: &SystemState, process: usize) -> ResourceVector {
    let need = state
        .need(process)
        .unwrap_or_else(|| ResourceVector::zeros(state.resource_types()));
    need.iter()
        .map(|units| rng.random_range(0..=units.saturating_add(1)))
        .collect::<Vec<_>>()
        .into()
}
