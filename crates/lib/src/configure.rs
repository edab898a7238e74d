//! One configuration pass: validate, compose, render.

use thiserror::Error;
use tracing::debug;

use crate::args::ResolvedArgs;
use crate::compose::{FlagSet, compose};
use crate::overlay::BuildConfig;
use crate::platform::{ProbeError, TripleSource};
use crate::render::render;
use crate::validate::{ValidationErrors, validate};

#[derive(Debug, Error)]
pub enum ConfigureError {
  #[error(transparent)]
  Invalid(#[from] ValidationErrors),

  #[error("failed to determine the target triple: {0}")]
  Probe(#[from] ProbeError),
}

/// Result of a successful pass
#[derive(Debug)]
pub struct Configured {
  pub flags: FlagSet,
  pub makefile: String,
}

/// Runs validation, flag composition and rendering in that order.
///
/// Nothing is composed when validation finds a problem, so the host triple is
/// never probed for invalid arguments. Writing the result is left to the caller.
pub fn configure(
  args: &ResolvedArgs,
  config: &BuildConfig,
  packages: &[String],
  host: &dyn TripleSource,
) -> Result<Configured, ConfigureError> {
  validate(args).into_result()?;
  debug!("arguments validated");

  let flags = compose(args, host)?;
  let makefile = render(&flags, config, args, packages);

  Ok(Configured { flags, makefile })
}
