mod output;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use easyconf_lib::args::ResolvedArgs;
use easyconf_lib::configure::{Configured, configure};
use easyconf_lib::consts::{DEFAULT_OUTPUT, DEFAULT_PREFIX, PROJECT_NAME};
use easyconf_lib::feature::FeatureTable;
use easyconf_lib::manifest::ProjectManifest;
use easyconf_lib::overlay::BuildConfig;
use easyconf_lib::platform::{ToolchainProbe, Triple};
use easyconf_lib::render::write_makefile;

use crate::output::{format_list, print_error, print_stat, print_success};

/// Options whose value may follow as a separate argument
const VALUE_FLAGS: &[&str] = &["--prefix", "-o", "--output", "--target"];

/// Configure Easyinit before building
#[derive(Parser, Debug)]
#[command(name = "configure", disable_version_flag = true)]
struct Cli {
  /// Show the version of Easyinit and of this configure script
  #[arg(short = 'V', long = "version")]
  show_version: bool,

  /// Installation prefix
  #[arg(long, value_name = "PATH", default_value = DEFAULT_PREFIX, allow_hyphen_values = true)]
  prefix: PathBuf,

  /// Make this script more talkative
  #[arg(short, long)]
  verbose: bool,

  /// Where to put the generated Makefile
  #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT, allow_hyphen_values = true)]
  output: PathBuf,

  /// Build without network access (run `make pre-fetch` first)
  #[arg(long, visible_alias = "offline")]
  frozen: bool,

  /// Build for this target triple instead of the host
  #[arg(long, value_name = "TRIPLE")]
  target: Option<Triple>,

  /// Build the debug profile instead of release
  #[arg(long, visible_alias = "no-release")]
  debug: bool,

  /// Optimize for the CPU of this machine
  #[arg(long)]
  native: bool,

  /// Toolchain overrides, e.g. `rustc=/opt/rust/bin/rustc cargo=cargo-nightly`
  #[arg(value_name = "KEY=VALUE")]
  overrides: Vec<String>,
}

impl Cli {
  fn into_resolved(self, features: FeatureTable) -> ResolvedArgs {
    ResolvedArgs {
      prefix: self.prefix,
      verbose: self.verbose,
      output: self.output,
      target: self.target,
      native: self.native,
      debug: self.debug,
      frozen: self.frozen,
      features,
    }
  }
}

fn main() -> ExitCode {
  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn run() -> Result<()> {
  // Feature spellings are pulled out before clap sees the arguments so that
  // their command-line order is preserved.
  let mut features = FeatureTable::standard();
  let scan = features.scan(std::env::args_os(), VALUE_FLAGS);
  let matches = Cli::command().after_help(features.help()).get_matches_from(scan.rest);
  let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

  init_tracing(cli.verbose);

  let root = std::env::current_dir().context("Failed to determine the project directory")?;

  if cli.show_version {
    print_version(&root);
    return Ok(());
  }

  features.apply_all(&scan.matches);

  let config = BuildConfig::parse(&cli.overrides).context("Failed to parse overrides")?;
  let manifest = ProjectManifest::load(&root).context("Failed to read the project manifest")?;
  let args = cli.into_resolved(features);

  let probe = ToolchainProbe::new(config.rustc.as_str());
  let configured = configure(&args, &config, &manifest.packages, &probe)?;

  write_makefile(&args.output, &configured.makefile)?;
  print_summary(&args, &configured);

  Ok(())
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_target(false)
    .without_time()
    .init();
}

fn print_version(root: &Path) {
  let version = match ProjectManifest::load(root) {
    Ok(manifest) => manifest.version,
    Err(e) => {
      warn!(error = %e, "could not read the project version");
      None
    }
  };

  println!("{} {}", PROJECT_NAME, version.as_deref().unwrap_or("unknown"));
  println!("Configure Script: {}", env!("CARGO_PKG_VERSION"));
}

fn print_summary(args: &ResolvedArgs, configured: &Configured) {
  let target = configured
    .flags
    .target()
    .map(Triple::to_string)
    .unwrap_or_else(|| "native".to_string());

  print_success(&format!("Wrote {}", args.output.display()));
  print_stat("Profile", args.profile().as_str());
  print_stat("Target", &target);
  print_stat("Features", &format_list(configured.flags.features()));
  print_stat("Prefix", &args.prefix.display().to_string());
  print_stat("Flags", &configured.flags.tokens().join(" "));
}
