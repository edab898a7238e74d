//! Tri-state feature switches.
//!
//! Every feature answers to five spellings on the command line:
//! `--<name>`, `--enable-<name>`, `--with-<name>`, `--disable-<name>` and
//! `--without-<name>`. The switches are kept in a declaration-ordered
//! [`FeatureTable`]; a single resolution path handles every entry.

use std::ffi::OsString;
use std::fmt;

use tracing::{debug, warn};

use crate::platform::detect_service_manager;

/// Which spelling of a feature switch was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
  Bare,
  Enable,
  With,
  Disable,
  Without,
}

impl Alias {
  pub const ALL: [Alias; 5] = [Alias::Bare, Alias::Enable, Alias::With, Alias::Disable, Alias::Without];

  /// Returns the flag prefix for this spelling
  pub const fn prefix(self) -> &'static str {
    match self {
      Alias::Bare => "--",
      Alias::Enable => "--enable-",
      Alias::With => "--with-",
      Alias::Disable => "--disable-",
      Alias::Without => "--without-",
    }
  }

  /// Returns the full flag for a feature name (e.g., "--without-systemd")
  pub fn spelling(self, name: &str) -> String {
    format!("{}{}", self.prefix(), name)
  }
}

/// Default value of a feature that was not set explicitly.
pub enum FeatureDefault {
  Value(bool),
  /// Evaluated each time an unset option is resolved
  Deferred(Box<dyn Fn() -> bool>),
}

impl FeatureDefault {
  pub fn evaluate(&self) -> bool {
    match self {
      FeatureDefault::Value(value) => *value,
      FeatureDefault::Deferred(probe) => probe(),
    }
  }
}

impl fmt::Debug for FeatureDefault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FeatureDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
      FeatureDefault::Deferred(_) => f.write_str("Deferred(..)"),
    }
  }
}

/// A single feature switch
#[derive(Debug)]
pub struct FeatureOption {
  name: String,
  help: String,
  unstable: bool,
  default: FeatureDefault,
  value: Option<bool>,
}

impl FeatureOption {
  pub fn new(name: impl Into<String>, default: bool) -> Self {
    Self::with_default(name, FeatureDefault::Value(default))
  }

  /// Declares a switch whose default is computed only when needed.
  pub fn deferred(name: impl Into<String>, probe: impl Fn() -> bool + 'static) -> Self {
    Self::with_default(name, FeatureDefault::Deferred(Box::new(probe)))
  }

  fn with_default(name: impl Into<String>, default: FeatureDefault) -> Self {
    Self {
      name: name.into(),
      help: String::new(),
      unstable: false,
      default,
      value: None,
    }
  }

  /// Marks the feature as unstable; enabling it logs a warning.
  pub fn unstable(mut self) -> Self {
    self.unstable = true;
    self
  }

  pub fn help(mut self, help: impl Into<String>) -> Self {
    self.help = help.into();
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Returns the explicitly requested value, if any
  pub fn explicit(&self) -> Option<bool> {
    self.value
  }

  /// Applies one spelling of this switch. Later calls override earlier ones.
  pub fn apply(&mut self, alias: Alias) {
    match alias {
      Alias::Enable | Alias::With => {
        if self.unstable {
          warn!(feature = %self.name, "feature is unstable and may not build or work correctly");
        }
        self.value = Some(true);
      }
      Alias::Disable | Alias::Without => self.value = Some(false),
      Alias::Bare => self.value = None,
    }
    debug!(feature = %self.name, flag = %alias.spelling(&self.name), "applied feature flag");
  }

  /// Returns the explicit value, or evaluates the default.
  pub fn resolve(&self) -> bool {
    self.value.unwrap_or_else(|| self.default.evaluate())
  }
}

/// One feature spelling found on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureMatch {
  pub index: usize,
  pub alias: Alias,
}

/// Command-line arguments split into feature spellings and everything else
#[derive(Debug, Default)]
pub struct FeatureScan {
  /// Feature spellings in command-line order
  pub matches: Vec<FeatureMatch>,
  /// Remaining arguments, handed to the regular argument parser
  pub rest: Vec<OsString>,
}

/// Declaration-ordered set of feature switches
#[derive(Debug, Default)]
pub struct FeatureTable {
  options: Vec<FeatureOption>,
}

impl FeatureTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// The switches offered by `configure`.
  pub fn standard() -> Self {
    let mut table = Self::new();
    table
      .declare(
        FeatureOption::new("selinux", false)
          .unstable()
          .help("Enable or disable SELinux support"),
      )
      .declare(FeatureOption::new("coreutils", false).help("Enable or disable coreutils integration"))
      .declare(
        FeatureOption::deferred("systemd", detect_service_manager)
          .help("Allow systemd integration (default: on when systemctl is found on PATH)"),
      );
    table
  }

  pub fn declare(&mut self, option: FeatureOption) -> &mut Self {
    self.options.push(option);
    self
  }

  pub fn get(&self, name: &str) -> Option<&FeatureOption> {
    self.options.iter().find(|option| option.name == name)
  }

  /// Maps a command-line flag to the option it controls and the spelling used.
  pub fn lookup(&self, flag: &str) -> Option<FeatureMatch> {
    self.options.iter().enumerate().find_map(|(index, option)| {
      Alias::ALL
        .into_iter()
        .find(|alias| flag.strip_prefix(alias.prefix()) == Some(option.name.as_str()))
        .map(|alias| FeatureMatch { index, alias })
    })
  }

  /// Splits raw arguments into feature spellings and the remainder.
  ///
  /// `value_flags` lists the options that take their value as the next
  /// argument (e.g. `--prefix`); that argument is passed through untouched even
  /// if it looks like a feature spelling. Scanning stops at a `--` separator;
  /// everything after it is passed through.
  pub fn scan<I, T>(&self, args: I, value_flags: &[&str]) -> FeatureScan
  where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
  {
    let mut scan = FeatureScan::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
      if arg == "--" {
        scan.rest.push(arg);
        break;
      }
      let flag = arg.to_str();
      if flag.is_some_and(|flag| value_flags.contains(&flag)) {
        scan.rest.push(arg);
        scan.rest.extend(args.next());
        continue;
      }
      let found = flag.and_then(|flag| self.lookup(flag));
      match found {
        Some(found) => scan.matches.push(found),
        None => scan.rest.push(arg),
      }
    }
    scan.rest.extend(args);

    scan
  }

  /// Applies scanned spellings in command-line order.
  pub fn apply_all(&mut self, matches: &[FeatureMatch]) {
    for found in matches {
      if let Some(option) = self.options.get_mut(found.index) {
        option.apply(found.alias);
      }
    }
  }

  /// Applies a single flag. Returns false if it names no feature.
  pub fn apply_flag(&mut self, flag: &str) -> bool {
    match self.lookup(flag) {
      Some(found) => {
        self.apply_all(&[found]);
        true
      }
      None => false,
    }
  }

  /// Names of the features that resolve to true, in declaration order.
  ///
  /// Each option is resolved exactly once per call.
  pub fn enabled(&self) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for option in &self.options {
      if !names.contains(&option.name()) && option.resolve() {
        names.push(option.name());
      }
    }
    names
  }

  /// Help text listing every switch with all of its spellings
  pub fn help(&self) -> String {
    let mut text = String::from("Feature switches:\n");
    for option in &self.options {
      let spellings: Vec<String> = Alias::ALL.iter().map(|alias| alias.spelling(&option.name)).collect();
      text.push_str(&format!("  {}\n", spellings.join(" | ")));
      if !option.help.is_empty() {
        let unstable = if option.unstable { " [unstable]" } else { "" };
        text.push_str(&format!("          {}{}\n", option.help, unstable));
      }
    }
    text
  }
}
