#![cfg(test)]

use std::collections::HashSet;

use crate::error::{CommandFailed, FailureReason};
use crate::runner::CommandRunner;

/// Records every command it is asked to run instead of spawning anything.
pub struct FakeRunner {
    pub invoked: Vec<String>,
    fail_on: HashSet<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            invoked: Vec::new(),
            fail_on: HashSet::new(),
        }
    }

    /// A runner whose `command` exits with status 1.
    pub fn failing_on(command: &str) -> Self {
        let mut runner = Self::new();
        runner.fail_on.insert(command.to_string());
        runner
    }
}

impl CommandRunner for FakeRunner {
    fn run(&mut self, command: &str) -> Result<String, CommandFailed> {
        self.invoked.push(command.to_string());
        if self.fail_on.contains(command) {
            return Err(CommandFailed::new(command, FailureReason::ExitCode(1)));
        }
        Ok(format!("ran {}\n", command))
    }
}
