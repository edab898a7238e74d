//! Reads the project version and package list from the project `Cargo.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::MANIFEST_FILE;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
  package: Option<RawPackage>,
  workspace: Option<RawWorkspace>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
  name: Option<String>,
  /// A string, or `{ workspace = true }`
  version: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspace {
  #[serde(default)]
  members: Vec<String>,
  package: Option<RawWorkspacePackage>,
}

#[derive(Debug, Deserialize)]
struct RawWorkspacePackage {
  version: Option<String>,
}

/// What `configure` needs to know about the project it is configuring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
  pub version: Option<String>,
  /// Package names in manifest order; one build rule is generated for each
  pub packages: Vec<String>,
}

impl ProjectManifest {
  /// Loads `Cargo.toml` from the project root.
  ///
  /// A missing manifest is not an error: the result is empty and a warning is
  /// logged. Workspace members are resolved to their package names; glob
  /// members are skipped.
  pub fn load(root: &Path) -> Result<Self, ManifestError> {
    let path = root.join(MANIFEST_FILE);
    let raw = match read_manifest(&path)? {
      Some(raw) => raw,
      None => {
        warn!(path = %path.display(), "no project manifest found, generating rules for the whole workspace");
        return Ok(Self::default());
      }
    };

    let workspace = raw.workspace.unwrap_or_default();
    let version = workspace
      .package
      .and_then(|package| package.version)
      .or_else(|| {
        raw
          .package
          .as_ref()
          .and_then(|package| package.version.as_ref())
          .and_then(|version| version.as_str())
          .map(String::from)
      });

    let mut packages = Vec::new();
    if let Some(name) = raw.package.and_then(|package| package.name) {
      packages.push(name);
    }
    for member in &workspace.members {
      if member.contains(['*', '?', '[']) {
        warn!(member = %member, "glob workspace members are not expanded, skipping");
        continue;
      }
      let name = member_name(root, member);
      if !packages.contains(&name) {
        packages.push(name);
      }
    }

    debug!(version = ?version, packages = ?packages, "loaded project manifest");
    Ok(Self { version, packages })
  }
}

fn read_manifest(path: &Path) -> Result<Option<RawManifest>, ManifestError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(ManifestError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  toml::from_str(&content)
    .map(Some)
    .map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })
}

/// Package name of a workspace member, falling back to its directory name.
fn member_name(root: &Path, member: &str) -> String {
  let member_dir = root.join(member);
  let declared = match read_manifest(&member_dir.join(MANIFEST_FILE)) {
    Ok(raw) => raw.and_then(|raw| raw.package).and_then(|package| package.name),
    Err(e) => {
      debug!(member = %member, error = %e, "could not read member manifest");
      None
    }
  };

  declared.unwrap_or_else(|| {
    member_dir
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| member.to_string())
  })
}
