mod probe;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use probe::{
  ProbeError, SERVICE_MANAGER_BINARIES, ToolchainProbe, TripleSource, detect_service_manager, parse_host_line,
};

/// Target triple understood by the Rust toolchain (e.g., "x86_64-unknown-linux-gnu")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid target triple `{value}`: {reason}")]
pub struct TripleParseError {
  pub value: String,
  pub reason: &'static str,
}

impl Triple {
  /// Returns the triple string
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl FromStr for Triple {
  type Err = TripleParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = |reason| TripleParseError {
      value: s.to_string(),
      reason,
    };

    if s.is_empty() {
      return Err(invalid("triple is empty"));
    }
    if s.chars().any(char::is_whitespace) {
      return Err(invalid("triple contains whitespace"));
    }
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() < 2 || parts.iter().any(|part| part.is_empty()) {
      return Err(invalid("expected at least `<arch>-<os>`"));
    }

    Ok(Self(s.to_string()))
  }
}

impl fmt::Display for Triple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
