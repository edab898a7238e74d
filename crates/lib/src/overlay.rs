//! `KEY=VALUE` overrides given after the regular flags.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::consts::{DEFAULT_CARGO, DEFAULT_RUSTC};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
  #[error("malformed override `{entry}`: expected KEY=VALUE")]
  Malformed { entry: String },
}

/// Toolchain settings collected from overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  pub rustc: String,
  pub cargo: String,
  /// Unrecognized keys, kept so they show up in diagnostics
  pub extra: BTreeMap<String, String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      rustc: DEFAULT_RUSTC.to_string(),
      cargo: DEFAULT_CARGO.to_string(),
      extra: BTreeMap::new(),
    }
  }
}

impl BuildConfig {
  /// Parses override entries.
  ///
  /// Each entry is split on its first `=`. Keys are lower-cased and the last
  /// occurrence of a key wins. Unknown keys are kept in `extra` and warned
  /// about once each.
  pub fn parse<I, S>(entries: I) -> Result<Self, OverlayError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut config = Self::default();

    for entry in entries {
      let entry = entry.as_ref();
      let (key, value) = entry
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| OverlayError::Malformed {
          entry: entry.to_string(),
        })?;

      match key.to_lowercase().as_str() {
        "rustc" => config.rustc = value.to_string(),
        "cargo" => config.cargo = value.to_string(),
        other => {
          config.extra.insert(other.to_string(), value.to_string());
        }
      }
    }

    for key in config.extra.keys() {
      warn!(key = %key, "unknown override `{}`, ignoring", key);
    }

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_test::traced_test;

  #[test]
  fn no_entries_gives_defaults() {
    let config = BuildConfig::parse(Vec::<String>::new()).unwrap();
    assert_eq!(config, BuildConfig::default());
    assert_eq!(config.rustc, "rustc");
    assert_eq!(config.cargo, "cargo");
  }

  #[test]
  #[traced_test]
  fn known_fields_override_and_unknown_are_kept() {
    let config = BuildConfig::parse(["rustc=clang", "cargo=cargo-alt", "bogus=1"]).unwrap();

    assert_eq!(config.rustc, "clang");
    assert_eq!(config.cargo, "cargo-alt");
    assert_eq!(config.extra.len(), 1);
    assert_eq!(config.extra.get("bogus").map(String::as_str), Some("1"));
    assert!(logs_contain("unknown override `bogus`"));
  }

  #[test]
  fn keys_are_case_insensitive_and_last_wins() {
    let config = BuildConfig::parse(["RUSTC=first", "Rustc=second", "CC=gcc", "cc=clang"]).unwrap();
    assert_eq!(config.rustc, "second");
    assert_eq!(config.extra.get("cc").map(String::as_str), Some("clang"));
  }

  #[test]
  fn splits_on_first_separator_only() {
    let config = BuildConfig::parse(["cargo=/opt/bin/cargo=v2", "empty="]).unwrap();
    assert_eq!(config.cargo, "/opt/bin/cargo=v2");
    assert_eq!(config.extra.get("empty").map(String::as_str), Some(""));
  }

  #[test]
  fn entry_without_separator_is_malformed() {
    let err = BuildConfig::parse(["rustc=clang", "cargo"]).unwrap_err();
    assert_eq!(
      err,
      OverlayError::Malformed {
        entry: "cargo".to_string()
      }
    );
    assert!(err.to_string().contains("`cargo`"));
  }

  #[test]
  fn entry_with_empty_key_is_malformed() {
    assert!(BuildConfig::parse(["=value"]).is_err());
  }
}
