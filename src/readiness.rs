//! Waiting for services after `up`.
//!
//! The fixed strategy only pauses. It verifies nothing and services may still
//! be starting when it returns. The probe strategy polls a TCP connect to
//! every configured service port with exponential backoff.

use anyhow::{bail, Result};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::{ReadinessConfig, ReadinessStrategy, ServiceConfig};

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(2);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// Paused for a fixed duration without checking anything.
    Waited(Duration),
    /// Every service accepted a connection.
    Reachable { elapsed: Duration, attempts: u32 },
}

pub fn wait_until_ready(
    config: &ReadinessConfig,
    services: &[ServiceConfig],
    sleep: &mut dyn FnMut(Duration),
) -> Result<ReadinessOutcome> {
    match config.strategy {
        ReadinessStrategy::Fixed => {
            let wait = Duration::from_secs(config.wait_secs);
            debug!(?wait, "fixed readiness wait");
            if !wait.is_zero() {
                sleep(wait);
            }
            Ok(ReadinessOutcome::Waited(wait))
        }
        ReadinessStrategy::Probe => probe_until_ready(
            &config.host,
            services,
            Duration::from_secs(config.timeout_secs),
            sleep,
        ),
    }
}

fn probe_until_ready(
    host: &str,
    services: &[ServiceConfig],
    timeout: Duration,
    sleep: &mut dyn FnMut(Duration),
) -> Result<ReadinessOutcome> {
    let started = Instant::now();
    // A timeout too large to represent as an instant never expires.
    let deadline = started.checked_add(timeout);
    let mut pending: Vec<&ServiceConfig> = services.iter().collect();
    let mut delay = INITIAL_BACKOFF;
    let mut attempts = 0;

    loop {
        attempts += 1;
        pending.retain(|s| !is_reachable(host, s.port));
        debug!(attempts, pending = pending.len(), "readiness probe");

        if pending.is_empty() {
            return Ok(ReadinessOutcome::Reachable {
                elapsed: started.elapsed(),
                attempts,
            });
        }

        let now = Instant::now();
        let remaining = deadline.map(|d| d.saturating_duration_since(now));
        if remaining == Some(Duration::ZERO) {
            let names = pending
                .iter()
                .map(|s| format!("{} ({}:{})", s.name, host, s.port))
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "services not ready after {}s: {}\n  hint: check `docker-compose logs` or raise readiness.timeout_secs",
                timeout.as_secs(),
                names
            );
        }

        sleep(remaining.map_or(delay, |r| delay.min(r)));
        delay = (delay * 2).min(MAX_BACKOFF);
    }
}

fn is_reachable(host: &str, port: u16) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!(host, port, error = %e, "could not resolve");
            return false;
        }
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok() {
            return true;
        }
    }
    false
}
