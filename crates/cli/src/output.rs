//! CLI output formatting utilities.
//!
//! Colored status lines for the summary printed after a successful run and
//! for fatal errors.

use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
}

/// Comma-separated list, or "none"
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
  if items.is_empty() {
    return "none".to_string();
  }
  items.iter().map(|item| item.as_ref()).collect::<Vec<&str>>().join(", ")
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}
