//! Merged command-line state for one configuration pass.

use std::fmt;
use std::path::PathBuf;

use crate::consts::{DEFAULT_OUTPUT, DEFAULT_PREFIX};
use crate::feature::FeatureTable;
use crate::platform::Triple;

/// Cargo build profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
  Release,
  Debug,
}

impl Profile {
  /// Directory name cargo uses for this profile under `target/`
  pub const fn as_str(&self) -> &'static str {
    match self {
      Profile::Release => "release",
      Profile::Debug => "debug",
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug)]
pub struct ResolvedArgs {
  pub prefix: PathBuf,
  pub verbose: bool,
  /// Where the generated Makefile is written
  pub output: PathBuf,
  pub target: Option<Triple>,
  pub native: bool,
  pub debug: bool,
  /// `--frozen` / `--offline`
  pub frozen: bool,
  pub features: FeatureTable,
}

impl ResolvedArgs {
  /// Default settings around the given feature table.
  pub fn new(features: FeatureTable) -> Self {
    Self {
      prefix: PathBuf::from(DEFAULT_PREFIX),
      verbose: false,
      output: PathBuf::from(DEFAULT_OUTPUT),
      target: None,
      native: false,
      debug: false,
      frozen: false,
      features,
    }
  }

  pub fn profile(&self) -> Profile {
    if self.debug { Profile::Debug } else { Profile::Release }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_documented_values() {
    let args = ResolvedArgs::new(FeatureTable::new());
    assert_eq!(args.prefix, PathBuf::from("/usr/local"));
    assert_eq!(args.output, PathBuf::from("Makefile"));
    assert_eq!(args.profile(), Profile::Release);
  }

  #[test]
  fn debug_selects_debug_profile() {
    let mut args = ResolvedArgs::new(FeatureTable::new());
    args.debug = true;
    assert_eq!(args.profile().as_str(), "debug");
  }
}
