//! Rendering of safety reports and request outcomes.

use std::io::Write;

use serde::Serialize;

use kassavakt_core::{Outcome, RequestError, SafetyReport, Units};

use crate::error::CliError;

/// Everything a run decided, for machine readable output.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub safety: &'a SafetyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestReport<'a> {
    pub process: usize,
    pub request: &'a [Units],
    pub outcome: &'a Outcome,
}

pub fn write_yaml<W: Write>(out: &mut W, report: &RunReport<'_>) -> Result<(), CliError> {
    serde_yaml::to_writer(&mut *out, report)?;
    Ok(())
}

pub fn write_safety<W: Write>(out: &mut W, report: &SafetyReport) -> std::io::Result<()> {
    if report.safe {
        writeln!(out, "System is in a SAFE state.")?;
        writeln!(out, "Safe sequence: {}", report.sequence)
    } else {
        writeln!(out, "System is NOT in a safe state.")
    }
}

pub fn write_outcome<W: Write>(
    out: &mut W,
    process: usize,
    outcome: &Result<Outcome, RequestError>,
) -> std::io::Result<()> {
    match outcome {
        Ok(Outcome::Granted(sequence)) => {
            writeln!(
                out,
                "Request can be granted. System remains in a safe state."
            )?;
            writeln!(out, "Safe sequence: {sequence}")
        }
        Ok(Outcome::DeniedExceedsNeed { .. }) => writeln!(
            out,
            "Error: process {process} has requested more than its remaining need."
        ),
        Ok(Outcome::DeniedExceedsAvailable { .. }) => {
            writeln!(out, "Resources not available; request must wait.")
        }
        Ok(Outcome::DeniedUnsafe) => {
            writeln!(out, "Request CANNOT be granted. System would be unsafe.")
        }
        Err(RequestError::UnknownProcess { .. }) => writeln!(out, "Invalid process id."),
        Err(err @ RequestError::DimensionMismatch { .. }) => writeln!(out, "Error: {err}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassavakt_core::{ProcessId, SafeSequence};

    fn render(outcome: Result<Outcome, RequestError>) -> String {
        let mut out = Vec::new();
        write_outcome(&mut out, 2, &outcome).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_safe_report() {
        let report = SafetyReport {
            safe: true,
            sequence: SafeSequence::new(vec![ProcessId(1), ProcessId(0)]),
            passes: 1,
        };
        let mut out = Vec::new();
        write_safety(&mut out, &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "System is in a SAFE state.\nSafe sequence: P1 -> P0\n"
        );
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            render(Ok(Outcome::DeniedUnsafe)),
            "Request CANNOT be granted. System would be unsafe.\n"
        );
        assert_eq!(
            render(Ok(Outcome::DeniedExceedsNeed {
                resource: 0,
                requested: 2,
                need: 1
            })),
            "Error: process 2 has requested more than its remaining need.\n"
        );
        assert_eq!(
            render(Ok(Outcome::DeniedExceedsAvailable {
                resource: 0,
                requested: 4,
                available: 3
            })),
            "Resources not available; request must wait.\n"
        );
        assert_eq!(
            render(Err(RequestError::UnknownProcess {
                process: 9,
                processes: 5
            })),
            "Invalid process id.\n"
        );
    }

    #[test]
    fn test_yaml_report() {
        let safety = SafetyReport {
            safe: false,
            sequence: SafeSequence::new(vec![ProcessId(3)]),
            passes: 2,
        };
        let outcome = Outcome::DeniedUnsafe;
        let report = RunReport {
            safety: &safety,
            request: Some(RequestReport {
                process: 4,
                request: &[3, 3, 0],
                outcome: &outcome,
            }),
        };
        let mut out = Vec::new();
        write_yaml(&mut out, &report).unwrap();
        let yaml = String::from_utf8(out).unwrap();
        assert!(yaml.contains("safe: false"));
        assert!(yaml.contains("outcome: DeniedUnsafe"));
    }
}
