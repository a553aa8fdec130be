use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CommandFailed, FailureReason};

const RELAY_BUF_SIZE: usize = 8192;

/// Runs one command line to completion and returns its captured stdout.
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> Result<String, CommandFailed>;
}

/// Runs commands through the host shell, relaying output to this process's
/// own stdout and stderr.
#[derive(Debug, Default, Clone)]
pub struct ShellRunner {
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new(working_dir: Option<PathBuf>) -> Self {
        Self { working_dir }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> Result<String, CommandFailed> {
        run_command_with(
            command,
            self.working_dir.as_deref(),
            &mut io::stdout(),
            &mut io::stderr(),
        )
    }
}

/// Run `command` with the host shell, relaying the child's stdout and stderr
/// into `stdout` and `stderr` as bytes arrive.
///
/// Returns the full stdout text when the process exits with status zero.
/// Stderr is only relayed, never captured. There is no timeout: the call
/// blocks until the child exits.
pub fn run_command_with<O, E>(
    command: &str,
    working_dir: Option<&Path>,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<String, CommandFailed>
where
    O: Write + Send,
    E: Write + Send,
{
    if command.trim().is_empty() {
        return Err(CommandFailed::new(command, FailureReason::EmptyCommand));
    }

    let mut cmd = shell_command(command);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    debug!(command, dir = ?working_dir, "spawning");
    let started = Instant::now();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CommandFailed::new(command, FailureReason::Spawn(e)))?;

    let (Some(child_out), Some(child_err)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        let e = io::Error::new(io::ErrorKind::BrokenPipe, "child pipes were not captured");
        return Err(CommandFailed::new(command, FailureReason::Spawn(e)));
    };

    let mut captured = Vec::new();
    std::thread::scope(|s| {
        s.spawn(|| relay(child_err, stderr, None));
        relay(child_out, stdout, Some(&mut captured));
    });

    let status = child
        .wait()
        .map_err(|e| CommandFailed::new(command, FailureReason::Wait(e)))?;

    debug!(
        command,
        ?status,
        elapsed_ms = millis(started.elapsed()),
        stdout_bytes = captured.len(),
        "command exited"
    );

    check_status(command, status)?;
    Ok(String::from_utf8_lossy(&captured).into_owned())
}

/// Whole milliseconds of `d` for log fields, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn check_status(command: &str, status: ExitStatus) -> Result<(), CommandFailed> {
    if status.success() {
        return Ok(());
    }
    let reason = match status.code() {
        Some(code) => FailureReason::ExitCode(code),
        None => signal_reason(status),
    };
    Err(CommandFailed::new(command, reason))
}

#[cfg(unix)]
fn signal_reason(status: ExitStatus) -> FailureReason {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(sig) => FailureReason::Signal(sig),
        None => FailureReason::NoExitCode,
    }
}

#[cfg(not(unix))]
fn signal_reason(_status: ExitStatus) -> FailureReason {
    FailureReason::NoExitCode
}

/// Copy `src` into `sink` chunk by chunk until EOF, flushing after each chunk.
///
/// A failing sink stops the relay but not the draining: the pipe must be read
/// to EOF or the child can block on a full buffer.
fn relay<R: Read, W: Write>(mut src: R, sink: &mut W, mut capture: Option<&mut Vec<u8>>) {
    let mut buf = [0u8; RELAY_BUF_SIZE];
    let mut sink_ok = true;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "reading child output failed");
                break;
            }
        };
        let chunk = &buf[..n];
        if sink_ok {
            if let Err(e) = sink.write_all(chunk).and_then(|()| sink.flush()) {
                debug!(error = %e, "output sink closed, draining without relay");
                sink_ok = false;
            }
        }
        if let Some(captured) = capture.as_deref_mut() {
            captured.extend_from_slice(chunk);
        }
    }
}
