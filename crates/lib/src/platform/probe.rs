//! Host environment probes.
//!
//! Two facts are needed while configuring: whether the host runs a service
//! manager (seeds the `systemd` default) and the host target triple (fills in
//! `--target` when none was given). The second one spawns `rustc -vV`, so it
//! is memoized per probe.

use std::io;
use std::process::{Command, ExitStatus};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use super::Triple;

/// Control executables that identify a service manager on `PATH`
pub const SERVICE_MANAGER_BINARIES: &[&str] = &["systemctl"];

const HOST_MARKER: &str = "host:";

/// Errors that can occur while querying the toolchain
#[derive(Debug, Error)]
pub enum ProbeError {
  #[error("failed to run `{program} -vV` (is the Rust toolchain installed?): {source}")]
  ToolchainUnavailable { program: String, source: io::Error },

  #[error("`{program} -vV` exited with {status}")]
  ToolchainFailed { program: String, status: ExitStatus },

  #[error("`{program} -vV` did not report a usable `host:` line")]
  ProbeParse { program: String },
}

/// Returns true if a service manager control executable is on `PATH`
pub fn detect_service_manager() -> bool {
  SERVICE_MANAGER_BINARIES.iter().any(|binary| match which::which(binary) {
    Ok(path) => {
      debug!(path = %path.display(), "found service manager");
      true
    }
    Err(_) => false,
  })
}

/// Anything that can report the host target triple.
pub trait TripleSource {
  fn host_triple(&self) -> Result<Triple, ProbeError>;
}

/// Queries a rustc binary for its host triple.
///
/// The first successful answer is kept for the lifetime of the probe, so the
/// subprocess runs at most once no matter how often the triple is requested.
/// Failures are not cached.
#[derive(Debug)]
pub struct ToolchainProbe {
  rustc: String,
  host: Mutex<Option<Triple>>,
}

impl ToolchainProbe {
  pub fn new(rustc: impl Into<String>) -> Self {
    Self {
      rustc: rustc.into(),
      host: Mutex::new(None),
    }
  }

  fn query(&self) -> Result<Triple, ProbeError> {
    debug!(rustc = %self.rustc, "querying toolchain for host triple");

    let output = Command::new(&self.rustc)
      .arg("-vV")
      .output()
      .map_err(|source| ProbeError::ToolchainUnavailable {
        program: self.rustc.clone(),
        source,
      })?;

    if !output.status.success() {
      return Err(ProbeError::ToolchainFailed {
        program: self.rustc.clone(),
        status: output.status,
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_host_line(&stdout).ok_or_else(|| ProbeError::ProbeParse {
      program: self.rustc.clone(),
    })
  }
}

impl TripleSource for ToolchainProbe {
  fn host_triple(&self) -> Result<Triple, ProbeError> {
    let mut slot = self.host.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(triple) = slot.as_ref() {
      return Ok(triple.clone());
    }

    let triple = self.query()?;
    info!(triple = %triple, "detected host triple");
    *slot = Some(triple.clone());
    Ok(triple)
  }
}

/// Extracts the triple from the `host:` line of `rustc -vV` output.
pub fn parse_host_line(output: &str) -> Option<Triple> {
  output
    .lines()
    .find_map(|line| line.trim_start().strip_prefix(HOST_MARKER))
    .and_then(|rest| rest.split_whitespace().next_back())
    .and_then(|token| token.parse().ok())
}
