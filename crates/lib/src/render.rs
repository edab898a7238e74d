//! Makefile generation.
//!
//! Rendering is a pure function of its inputs: the same flags, config and
//! package list always give byte-identical output.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::args::{Profile, ResolvedArgs};
use crate::compose::FlagSet;
use crate::overlay::BuildConfig;
use crate::platform::Triple;

#[derive(Debug, Error)]
pub enum RenderError {
  #[error("failed to write Makefile {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

const HEADER: &str = "\
# A generated Makefile for Easyinit. Don't edit this file directly!
# Re-run `configure` to change any of the settings below.
";

const FIXED_RULES: [&str; 4] = ["all", "install", "clean", "pre-fetch"];

/// Renders the Makefile for one configuration.
pub fn render(flags: &FlagSet, config: &BuildConfig, args: &ResolvedArgs, packages: &[String]) -> String {
  let rules: Vec<String> = packages.iter().map(|package| rule_name(package)).collect();

  let phony: Vec<&str> = FIXED_RULES[..1]
    .iter()
    .copied()
    .chain(rules.iter().map(String::as_str))
    .chain(FIXED_RULES[1..].iter().copied())
    .collect();

  let flag_words: Vec<String> = flags.tokens().iter().map(|token| make_word(token)).collect();

  let mut out = String::from(HEADER);
  if args.frozen {
    out.push_str("# Offline build: run `make pre-fetch` with network access before `make`.\n");
  }
  out.push('\n');

  out.push_str(&format!("RUSTC ?= {}\n", make_value(&config.rustc)));
  out.push_str(&format!("CARGO ?= {}\n", make_value(&config.cargo)));
  out.push_str(&format!("PREFIX ?= {}\n", make_value(&args.prefix.display().to_string())));
  out.push_str("export RUSTC\n\n");
  out.push_str(&format!("FLAGS := {}\n", flag_words.join(" ")));
  out.push_str(&format!("BUILD_DIR := {}\n\n", build_dir(flags.target(), args.profile())));

  out.push_str(&format!(".PHONY: {}\n\n", phony.join(" ")));

  if rules.is_empty() {
    out.push_str("all:\n\t$(CARGO) build $(FLAGS)\n\n");
  } else {
    out.push_str(&format!("all: {}\n\n", rules.join(" ")));
    for (rule, package) in rules.iter().zip(packages) {
      out.push_str(&format!("{}:\n\t$(CARGO) build -p {} $(FLAGS)\n\n", rule, package));
    }
  }

  // Assumes GNU find and install (`-perm -u+x`, `install -t`). Binaries have
  // no extension; that keeps `.so`/`.d` files out.
  out.push_str("install: all\n");
  out.push_str("\tinstall -d $(DESTDIR)$(PREFIX)/bin\n");
  out.push_str(
    "\tfind $(BUILD_DIR) -maxdepth 1 -type f -perm -u+x ! -name '*.*' -exec install -m 755 -t $(DESTDIR)$(PREFIX)/bin {} +\n\n",
  );

  out.push_str("clean:\n\t$(CARGO) clean\n\n");

  let fetch_target = flags
    .target()
    .map(|triple| format!(" --target {}", triple))
    .unwrap_or_default();
  out.push_str(&format!("pre-fetch:\n\t$(CARGO) fetch{}\n", fetch_target));

  out
}

/// Writes the rendered Makefile, replacing any existing file.
pub fn write_makefile(path: &Path, content: &str) -> Result<(), RenderError> {
  fs::write(path, content).map_err(|source| RenderError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  info!(path = %path.display(), "wrote Makefile");
  info!("generated Makefile:\n{}", content);
  Ok(())
}

fn rule_name(package: &str) -> String {
  format!("build-{}", package)
}

/// Cargo's output directory for a target and profile
fn build_dir(target: Option<&Triple>, profile: Profile) -> String {
  match target {
    Some(triple) => format!("target/{}/{}", triple, profile),
    None => format!("target/{}", profile),
  }
}

/// Escapes `$` so make keeps the value literal.
fn make_value(value: &str) -> String {
  value.replace('$', "$$")
}

/// Quotes a token for a recipe line: shell-quoted when needed, `$` escaped for make.
fn make_word(token: &str) -> String {
  let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_=./,:+@%".contains(c);
  let word = if !token.is_empty() && token.chars().all(is_safe) {
    token.to_string()
  } else {
    format!("'{}'", token.replace('\'', r"'\''"))
  };
  make_value(&word)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compose::{NATIVE_CPU, compose};
  use crate::feature::{FeatureOption, FeatureTable};
  use crate::platform::{ProbeError, TripleSource};
  use tempfile::TempDir;

  struct NoHost;

  impl TripleSource for NoHost {
    fn host_triple(&self) -> Result<Triple, ProbeError> {
      Err(ProbeError::ProbeParse {
        program: "rustc".to_string(),
      })
    }
  }

  fn args() -> ResolvedArgs {
    let mut features = FeatureTable::new();
    features
      .declare(FeatureOption::new("coreutils", false))
      .declare(FeatureOption::deferred("systemd", || true));
    let mut args = ResolvedArgs::new(features);
    args.target = Some("x86_64-unknown-linux-gnu".parse().unwrap());
    args
  }

  fn packages() -> Vec<String> {
    vec!["config".to_string(), "journal".to_string()]
  }

  fn line<'a>(makefile: &'a str, prefix: &str) -> &'a str {
    makefile
      .lines()
      .find(|line| line.starts_with(prefix))
      .unwrap_or_else(|| panic!("no line starting with {:?} in:\n{}", prefix, makefile))
  }

  #[test]
  fn flags_variable_is_space_joined_tokens() {
    let mut args = args();
    args.debug = true;
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &packages());

    assert_eq!(flags.tokens().join(" "), line(&makefile, "FLAGS := ").trim_start_matches("FLAGS := "));
    assert_eq!(
      line(&makefile, "FLAGS := "),
      "FLAGS := --no-default-features --features=systemd --target x86_64-unknown-linux-gnu"
    );
    assert_eq!(
      line(&makefile, "BUILD_DIR := "),
      "BUILD_DIR := target/x86_64-unknown-linux-gnu/debug"
    );
  }

  #[test]
  fn tool_paths_come_from_overlay() {
    let args = args();
    let flags = compose(&args, &NoHost).unwrap();
    let config = BuildConfig::parse(["rustc=/opt/rust/bin/rustc", "cargo=cargo-alt"]).unwrap();

    let makefile = render(&flags, &config, &args, &packages());

    assert!(makefile.contains("RUSTC ?= /opt/rust/bin/rustc\n"));
    assert!(makefile.contains("CARGO ?= cargo-alt\n"));
    assert!(makefile.contains("PREFIX ?= /usr/local\n"));
  }

  #[test]
  fn variable_values_keep_dollar_signs_literal() {
    let mut args = args();
    args.prefix = "/opt/$pkg".into();
    let flags = compose(&args, &NoHost).unwrap();
    let config = BuildConfig::parse(["rustc=$HOME/bin/rustc", "cargo=cargo$(x)"]).unwrap();

    let makefile = render(&flags, &config, &args, &packages());

    assert!(makefile.contains("RUSTC ?= $$HOME/bin/rustc\n"));
    assert!(makefile.contains("CARGO ?= cargo$$(x)\n"));
    assert!(makefile.contains("PREFIX ?= /opt/$$pkg\n"));
  }

  #[test]
  fn install_copies_extensionless_executables() {
    let args = args();
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &packages());

    let install = line(&makefile, "\tfind $(BUILD_DIR)");
    assert!(install.contains("-type f -perm -u+x ! -name '*.*'"));
    assert!(install.ends_with("-t $(DESTDIR)$(PREFIX)/bin {} +"));
  }

  #[test]
  fn one_rule_per_package() {
    let args = args();
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &packages());

    assert_eq!(line(&makefile, "all:"), "all: build-config build-journal");
    assert!(makefile.contains("build-config:\n\t$(CARGO) build -p config $(FLAGS)\n"));
    assert!(makefile.contains("build-journal:\n\t$(CARGO) build -p journal $(FLAGS)\n"));
    assert_eq!(
      line(&makefile, ".PHONY:"),
      ".PHONY: all build-config build-journal install clean pre-fetch"
    );
    assert!(makefile.contains("pre-fetch:\n\t$(CARGO) fetch --target x86_64-unknown-linux-gnu\n"));
    assert!(makefile.contains("clean:\n\t$(CARGO) clean\n"));
    assert!(makefile.contains("install: all\n"));
  }

  #[test]
  fn no_packages_builds_whole_workspace() {
    let args = args();
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &[]);

    assert!(makefile.contains("all:\n\t$(CARGO) build $(FLAGS)\n"));
    assert_eq!(line(&makefile, ".PHONY:"), ".PHONY: all install clean pre-fetch");
  }

  #[test]
  fn native_build_quotes_rustflags_and_has_no_target() {
    let mut args = args();
    args.target = None;
    args.native = true;
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &packages());

    assert!(flags.tokens().contains(&NATIVE_CPU.to_string()));
    assert!(makefile.contains(r#"'--config=build.rustflags=["-Ctarget-cpu=native"]'"#));
    assert_eq!(line(&makefile, "BUILD_DIR := "), "BUILD_DIR := target/release");
    assert!(makefile.contains("pre-fetch:\n\t$(CARGO) fetch\n"));
  }

  #[test]
  fn frozen_build_mentions_prefetch() {
    let mut args = args();
    args.frozen = true;
    let flags = compose(&args, &NoHost).unwrap();

    let makefile = render(&flags, &BuildConfig::default(), &args, &packages());

    assert!(makefile.contains("run `make pre-fetch`"));
    assert!(line(&makefile, "FLAGS := ").contains("--frozen"));
  }

  #[test]
  fn rendering_is_idempotent() {
    let args = args();
    let flags = compose(&args, &NoHost).unwrap();
    let config = BuildConfig::default();

    let first = render(&flags, &config, &args, &packages());
    let second = render(&compose(&args, &NoHost).unwrap(), &config, &args, &packages());

    assert_eq!(first, second);
  }

  #[test]
  fn make_word_escapes_shell_and_make_metacharacters() {
    assert_eq!(make_word("--release"), "--release");
    assert_eq!(make_word("--features=a,b"), "--features=a,b");
    assert_eq!(make_word("it's"), r"'it'\''s'");
    assert_eq!(make_word("$HOME"), "'$$HOME'");
    assert_eq!(make_word(""), "''");
  }

  #[test]
  fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Makefile");
    fs::write(&path, "stale").unwrap();

    write_makefile(&path, "all:\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "all:\n");
  }

  #[test]
  fn write_into_missing_directory_fails_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("Makefile");

    let err = write_makefile(&path, "all:\n").unwrap_err();

    assert!(err.to_string().contains("missing"));
  }
}
