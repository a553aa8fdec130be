use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::runner::{millis, CommandRunner};

/// One command of a flow with the banner printed before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
    pub command: String,
}

impl Step {
    pub fn new(label: &str, command: String) -> Self {
        Self {
            label: label.to_string(),
            command,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub label: String,
    pub command: String,
    pub elapsed: Duration,
}

/// Run `steps` in order. The first failure is returned as is and the
/// remaining steps are never started.
pub fn run_steps(runner: &mut dyn CommandRunner, steps: &[Step]) -> Result<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(steps.len());

    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}...", step.label);
        debug!(step = i + 1, total = steps.len(), command = %step.command, "running step");

        let started = Instant::now();
        let stdout = runner.run(&step.command)?;
        let elapsed = started.elapsed();

        info!(
            command = %step.command,
            elapsed_ms = millis(elapsed),
            stdout_bytes = stdout.len(),
            "step done"
        );
        outcomes.push(StepOutcome {
            label: step.label.clone(),
            command: step.command.clone(),
            elapsed,
        });
    }

    Ok(outcomes)
}

/// One line per completed step, for the closing summary of a flow.
pub fn format_steps_human(steps: &[StepOutcome]) -> Vec<String> {
    steps
        .iter()
        .map(|s| format!("   - {} ({}, {:.1}s)", s.label, s.command, s.elapsed.as_secs_f64()))
        .collect()
}
