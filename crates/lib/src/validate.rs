//! Cross-option conflict checks.
//!
//! Every rule runs on every pass and all failures are collected, so the user
//! sees the whole list at once. New rules go into [`RULES`].

use std::fmt;

use thiserror::Error;

use crate::args::ResolvedArgs;

/// A structural problem with the given arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidArguments {
  /// The flags involved, as the user would type them
  pub flags: Vec<String>,
  pub message: String,
}

/// All problems found in one validation pass, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<InvalidArguments>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &InvalidArguments> {
    self.0.iter()
  }

  pub fn push(&mut self, error: InvalidArguments) {
    self.0.push(error);
  }

  /// `Ok(())` when nothing was found, otherwise the whole aggregate.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let noun = if self.0.len() == 1 { "argument" } else { "arguments" };
    write!(f, "{} invalid {}:", self.0.len(), noun)?;
    for error in &self.0 {
      write!(f, "\n  - {}", error)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

type Rule = fn(&ResolvedArgs) -> Option<InvalidArguments>;

const RULES: &[Rule] = &[native_conflicts_with_target];

/// Runs every rule against `args`.
pub fn validate(args: &ResolvedArgs) -> ValidationErrors {
  check(args, RULES)
}

fn check(args: &ResolvedArgs, rules: &[Rule]) -> ValidationErrors {
  let mut errors = ValidationErrors::default();
  for rule in rules {
    if let Some(error) = rule(args) {
      errors.push(error);
    }
  }
  errors
}

fn native_conflicts_with_target(args: &ResolvedArgs) -> Option<InvalidArguments> {
  let target = args.target.as_ref().filter(|_| args.native)?;
  Some(InvalidArguments {
    flags: vec!["--native".to_string(), format!("--target={}", target)],
    message: format!(
      "`--native` cannot be combined with `--target {}`: native builds always target the host",
      target
    ),
  })
}
