/// Name of the project being configured, as shown by `--version`
pub const PROJECT_NAME: &str = "Easyinit";

/// Default installation prefix
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Default location of the generated Makefile, relative to the project root
pub const DEFAULT_OUTPUT: &str = "Makefile";

/// Project manifest read for the version and the package list
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Default toolchain programs, overridable through the overlay
pub const DEFAULT_RUSTC: &str = "rustc";
pub const DEFAULT_CARGO: &str = "cargo";
