use anyhow::{Context, Result};
use std::time::Duration;

use super::steps::{format_steps_human, run_steps, Step, StepOutcome};
use crate::config::{Config, ReadinessStrategy};
use crate::readiness::{wait_until_ready, ReadinessOutcome};
use crate::runner::CommandRunner;

#[derive(Debug)]
pub struct SetupResult {
    pub steps: Vec<StepOutcome>,
    pub readiness: ReadinessOutcome,
    pub services: Vec<ServiceLine>,
    pub logs_hint: String,
    pub stop_hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLine {
    pub name: String,
    pub address: String,
}

pub fn setup_steps(config: &Config) -> Vec<Step> {
    vec![Step::new(
        "Building and starting containers",
        config.compose_command(&["up", "--build", "-d"]),
    )]
}

/// Setup: build and start containers, then wait for readiness. `sleep` is the
/// pause used by the readiness wait.
pub fn cmd_setup(
    runner: &mut dyn CommandRunner,
    config: &Config,
    sleep: &mut dyn FnMut(Duration),
) -> Result<SetupResult> {
    println!("Setting up development environment...\n");
    let steps = run_steps(runner, &setup_steps(config))
        .context("failed to set up development environment")?;

    match config.readiness.strategy {
        ReadinessStrategy::Fixed => println!("\nWaiting for databases to be ready..."),
        ReadinessStrategy::Probe => println!("\nWaiting for services to accept connections..."),
    }
    let readiness = wait_until_ready(&config.readiness, &config.services, sleep)
        .context("failed to set up development environment")?;

    let services = config
        .services
        .iter()
        .map(|s| ServiceLine {
            name: s.name.clone(),
            address: s.address(&config.readiness.host),
        })
        .collect();

    Ok(SetupResult {
        steps,
        readiness,
        services,
        logs_hint: format!("{} <service>", config.compose_command(&["logs", "-f"])),
        stop_hint: config.compose_command(&["down"]),
    })
}

pub fn format_setup_human(result: &SetupResult) -> String {
    let mut lines = vec![String::new(), "Development environment ready!".to_string()];

    if !result.steps.is_empty() {
        lines.push(String::new());
        lines.push("Completed steps:".to_string());
        lines.extend(format_steps_human(&result.steps));
    }

    if let ReadinessOutcome::Reachable { elapsed, attempts } = &result.readiness {
        lines.push(format!(
            "All services accepted connections after {:.1}s ({} {}).",
            elapsed.as_secs_f64(),
            attempts,
            if *attempts == 1 { "attempt" } else { "attempts" }
        ));
    }

    if !result.services.is_empty() {
        lines.push(String::new());
        lines.push("The following services are running:".to_string());
        for service in &result.services {
            lines.push(format!("   - {}: {}", service.name, service.address));
        }
    }

    lines.push(String::new());
    lines.push("Database migrations run automatically when each service starts.".to_string());
    lines.push(format!("View logs: {}", result.logs_hint));
    lines.push(format!("Stop: {}", result.stop_hint));
    lines.join("\n")
}
