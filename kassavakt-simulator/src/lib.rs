// kassavakt-simulator/src/lib.rs

/*!
# Kassavakt Simulator

Seeded fuzzing of the safety checker and request evaluator. Each iteration
draws a random consistent state, checks it twice, submits one random
request and verifies the invariants that must hold afterwards. Every
answer is folded into a BLAKE3 hash so a run can be reproduced and
compared by seed.

## Checked invariants:
- **Determinism:** two safety checks on the same state agree.
- **Sequence shape:** a permutation of all processes when safe, a strict subset otherwise.
- **Bounded passes:** never more passes than processes.
- **Rollback:** any denial leaves the state unchanged.
- **Conservation:** a grant keeps per-type totals and `Allocation <= Max`.
*/

use blake3::Hasher;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use kassavakt_config::FuzzConfig;
use kassavakt_core::{Outcome, SystemState};

mod error;
pub mod generator;

pub use error::SimulationError;

/// Counts collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FuzzSummary {
    pub iterations: usize,
    pub safe_states: usize,
    pub unsafe_states: usize,
    pub granted: usize,
    pub exceeds_need: usize,
    pub exceeds_available: usize,
    pub denied_unsafe: usize,
    /// Hex encoded BLAKE3 hash over every answer of the run.
    pub state_hash: String,
}

pub struct Simulator {
    seed: u64,
    config: FuzzConfig,
    pub state_hasher: Hasher,
}

impl Simulator {
    /// Fails when `config` has a zero or out-of-range bound.
    pub fn new(seed: u64, config: FuzzConfig) -> Result<Self, SimulationError> {
        Ok(Self {
            seed,
            config: config.checked()?,
            state_hasher: Hasher::new(),
        })
    }

    /// Runs `iterations` independent states. Iteration `i` uses seed `seed + i`.
    #[instrument(skip(self), fields(seed = self.seed))]
    pub fn run(&mut self, iterations: usize) -> Result<FuzzSummary, SimulationError> {
        let mut summary = FuzzSummary::default();
        for iteration in 0..iterations {
            self.run_iteration(iteration, &mut summary)?;
        }
        summary.iterations = iterations;
        summary.state_hash = hex::encode(self.state_hasher.finalize().as_bytes());
        info!(
            iterations,
            safe = summary.safe_states,
            granted = summary.granted,
            hash = %summary.state_hash,
            "fuzz run complete"
        );
        Ok(summary)
    }

    fn run_iteration(
        &mut self,
        iteration: usize,
        summary: &mut FuzzSummary,
    ) -> Result<(), SimulationError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(iteration as u64));
        let state = generator::random_state(&mut rng, &self.config)?;
        let violation = |reason: String| SimulationError::InvariantViolated { iteration, reason };

        let report = state.check_safety();
        if report != state.check_safety() {
            return Err(violation("safety check is not deterministic".into()));
        }
        if report.passes > state.processes() {
            return Err(violation(format!(
                "{} passes for {} processes",
                report.passes,
                state.processes()
            )));
        }
        let mut seen = report.sequence.indices();
        seen.sort_unstable();
        seen.dedup();
        let complete = seen.len() == state.processes();
        if seen.len() != report.sequence.len() || report.safe != complete {
            return Err(violation(format!(
                "sequence {} does not match safe = {}",
                report.sequence, report.safe
            )));
        }

        if report.safe {
            summary.safe_states += 1;
        } else {
            summary.unsafe_states += 1;
        }
        self.state_hasher.update(&[u8::from(report.safe)]);
        for process in report.sequence.indices() {
            self.state_hasher.update(&(process as u64).to_le_bytes());
        }

        let process = rng.random_range(0..state.processes());
        let request = generator::random_request(&mut rng, &state, process);
        let mut after = state.clone();
        let outcome = after.evaluate_request(process, &request)?;
        debug!(iteration, process, request = %request, outcome = %outcome, "evaluated");
        self.state_hasher.update(outcome.label().as_bytes());

        match &outcome {
            Outcome::Granted(_) => {
                summary.granted += 1;
                check_grant(&state, &after).map_err(violation)?;
            }
            denied => {
                match denied {
                    Outcome::DeniedExceedsNeed { .. } => summary.exceeds_need += 1,
                    Outcome::DeniedExceedsAvailable { .. } => summary.exceeds_available += 1,
                    _ => summary.denied_unsafe += 1,
                }
                if after != state {
                    return Err(violation(format!("state changed after {}", outcome.label())));
                }
            }
        }
        Ok(())
    }
}

fn check_grant(before: &SystemState, after: &SystemState) -> Result<(), String> {
    if after.totals() != before.totals() {
        return Err(format!(
            "totals changed from {} to {}",
            before.totals(),
            after.totals()
        ));
    }
    if !after.check_safety().safe {
        return Err("granted request left the state unsafe".into());
    }
    (0..after.processes())
        .find(|&p| !after.allocation()[p].fits_within(&after.max()[p]))
        .map_or(Ok(()), |p| Err(format!("allocation of P{p} exceeds its max")))
}

/// Compares a run's hash with an expected value.
pub fn validate_hash(summary: &FuzzSummary, expected: &str) -> Result<(), SimulationError> {
    if summary.state_hash.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(SimulationError::HashMismatch {
            expected: expected.to_string(),
            actual: summary.state_hash.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_counts_every_iteration() {
        let mut simulator = Simulator::new(1, FuzzConfig::default()).unwrap();
        let summary = simulator.run(200).unwrap();
        assert_eq!(summary.iterations, 200);
        assert_eq!(summary.safe_states + summary.unsafe_states, 200);
        assert_eq!(
            summary.granted
                + summary.exceeds_need
                + summary.exceeds_available
                + summary.denied_unsafe,
            200
        );
        assert_eq!(summary.state_hash.len(), 64);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let a = Simulator::new(9, FuzzConfig::default())
            .unwrap()
            .run(50)
            .unwrap();
        let b = Simulator::new(9, FuzzConfig::default())
            .unwrap()
            .run(50)
            .unwrap();
        assert_eq!(a, b);
        assert!(validate_hash(&a, &b.state_hash.to_uppercase()).is_ok());
    }

    #[test]
    fn test_different_seed_different_hash() {
        let a = Simulator::new(1, FuzzConfig::default())
            .unwrap()
            .run(50)
            .unwrap();
        let b = Simulator::new(2, FuzzConfig::default())
            .unwrap()
            .run(50)
            .unwrap();
        assert!(matches!(
            validate_hash(&a, &b.state_hash),
            Err(SimulationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_large_states() {
        let config = FuzzConfig {
            max_processes: 64,
            max_resource_types: 16,
            max_units: 1000,
            iterations: 20,
        };
        let summary = Simulator::new(3, config).unwrap().run(20).unwrap();
        assert_eq!(summary.iterations, 20);
    }

    #[test]
    fn test_zero_bounds_are_rejected() {
        let config = FuzzConfig {
            max_processes: 0,
            ..FuzzConfig::default()
        };
        assert!(matches!(
            Simulator::new(1, config),
            Err(SimulationError::Config(_))
        ));
    }
}
