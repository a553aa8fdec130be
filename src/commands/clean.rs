use anyhow::{Context, Result};

use super::steps::{format_steps_human, run_steps, Step, StepOutcome};
use crate::config::Config;
use crate::runner::CommandRunner;

#[derive(Debug)]
pub struct CleanResult {
    pub steps: Vec<StepOutcome>,
}

/// Teardown: stop containers, remove their volumes, prune unused images.
pub fn clean_steps(config: &Config) -> Vec<Step> {
    vec![
        Step::new("Stopping containers", config.compose_command(&["down"])),
        Step::new(
            "Removing database volumes",
            config.compose_command(&["down", "-v"]),
        ),
        Step::new(
            "Pruning unused images",
            config.docker_command(&["system", "prune", "-f"]),
        ),
    ]
}

pub fn cmd_clean(runner: &mut dyn CommandRunner, config: &Config) -> Result<CleanResult> {
    println!("Cleaning development environment...\n");
    let steps = run_steps(runner, &clean_steps(config))
        .context("failed to clean development environment")?;
    Ok(CleanResult { steps })
}

pub fn format_clean_human(result: &CleanResult) -> String {
    let mut lines = vec![String::new(), "Development environment cleaned!".to_string()];
    if !result.steps.is_empty() {
        lines.push(String::new());
        lines.push("Completed steps:".to_string());
        lines.extend(format_steps_human(&result.steps));
    }
    lines.push(String::new());
    lines.push("To set up the environment again, run:".to_string());
    lines.push("   devenv setup".to_string());
    lines.push("   or".to_string());
    lines.push("   dev-setup".to_string());
    lines.join("\n")
}
