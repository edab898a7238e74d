//! Composition of the cargo flag list.
//!
//! The order of the tokens is stable: downstream tooling greps the generated
//! Makefile for them.
//!
//! 1. `--no-default-features`
//! 2. `--release` (unless debug)
//! 3. `--features=a,b` (only when something is enabled)
//! 4. `--frozen` (when requested)
//! 5. the native CPU flag, or `--target <triple>`

use tracing::debug;

use crate::args::ResolvedArgs;
use crate::platform::{ProbeError, Triple, TripleSource};

pub const NO_DEFAULT_FEATURES: &str = "--no-default-features";
pub const RELEASE: &str = "--release";
pub const FROZEN: &str = "--frozen";
pub const TARGET: &str = "--target";
pub const NATIVE_CPU: &str = r#"--config=build.rustflags=["-Ctarget-cpu=native"]"#;

/// Composed cargo flags plus the facts the Makefile needs alongside them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
  tokens: Vec<String>,
  features: Vec<String>,
  target: Option<Triple>,
}

impl FlagSet {
  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  /// Enabled features, in declaration order
  pub fn features(&self) -> &[String] {
    &self.features
  }

  /// Target triple passed to cargo; `None` for native builds
  pub fn target(&self) -> Option<&Triple> {
    self.target.as_ref()
  }
}

/// Builds the flag list for validated arguments.
///
/// The host triple is requested from `host` only when no explicit target was
/// given and the build is not native.
pub fn compose(args: &ResolvedArgs, host: &dyn TripleSource) -> Result<FlagSet, ProbeError> {
  let mut tokens = vec![NO_DEFAULT_FEATURES.to_string()];

  if !args.debug {
    tokens.push(RELEASE.to_string());
  }

  let features: Vec<String> = args.features.enabled().into_iter().map(String::from).collect();
  if !features.is_empty() {
    tokens.push(format!("--features={}", features.join(",")));
  }

  if args.frozen {
    tokens.push(FROZEN.to_string());
  }

  let target = if args.native {
    tokens.push(NATIVE_CPU.to_string());
    None
  } else {
    let triple = match &args.target {
      Some(triple) => triple.clone(),
      None => host.host_triple()?,
    };
    tokens.push(TARGET.to_string());
    tokens.push(triple.to_string());
    Some(triple)
  };

  debug!(flags = ?tokens, "composed cargo flags");

  Ok(FlagSet {
    tokens,
    features,
    target,
  })
}
