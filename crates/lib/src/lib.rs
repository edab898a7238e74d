//! easyconf-lib: option resolution and Makefile generation for `configure`
//!
//! This crate provides everything behind the `configure` binary:
//! - `feature`: tri-state feature switches and their spellings
//! - `overlay`: `key=value` overrides for toolchain paths
//! - `validate`: aggregated conflict checks
//! - `compose`: the ordered cargo flag list
//! - `render`: the generated Makefile
//! - `platform`: host triple and service manager probes

pub mod args;
pub mod compose;
pub mod configure;
pub mod consts;
pub mod feature;
pub mod manifest;
pub mod overlay;
pub mod platform;
pub mod render;
pub mod validate;
