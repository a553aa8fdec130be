use std::io;

/// The single failure kind of [`crate::runner`]: the command could not be
/// started, could not be waited on, or did not exit with status zero.
#[derive(Debug, thiserror::Error)]
#[error("command `{command}` failed: {reason}")]
pub struct CommandFailed {
    pub command: String,
    pub reason: FailureReason,
}

#[derive(Debug, thiserror::Error)]
pub enum FailureReason {
    #[error("empty command line")]
    EmptyCommand,

    #[error("could not spawn: {0}")]
    Spawn(io::Error),

    #[error("could not wait for process: {0}")]
    Wait(io::Error),

    #[error("exit status {0}")]
    ExitCode(i32),

    #[error("terminated by signal {0}")]
    Signal(i32),

    #[error("exited without a status code")]
    NoExitCode,
}

impl CommandFailed {
    pub fn new(command: &str, reason: FailureReason) -> Self {
        Self {
            command: command.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_command_and_reason() {
        let err = CommandFailed::new("docker-compose down", FailureReason::ExitCode(2));
        assert_eq!(
            err.to_string(),
            "command `docker-compose down` failed: exit status 2"
        );
    }

    #[test]
    fn display_includes_io_error_text() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
        let err = CommandFailed::new("docker ps", FailureReason::Spawn(io_err));
        assert!(err.to_string().contains("No such file or directory"));
    }
}
