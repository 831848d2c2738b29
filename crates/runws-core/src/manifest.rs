//! `package.json` model and reading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf, absolute};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Workspace declarations, either a bare list or the `{ "packages": [...] }` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkspaceDeclarations {
    /// `"workspaces": ["packages/*"]`
    List(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"] }`
    Packages {
        /// Glob patterns
        #[serde(default)]
        packages: Vec<String>,
    },
}

/// The subset of a package manifest this tool reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name
    #[serde(default)]
    pub name: Option<String>,
    /// Script name to command
    #[serde(default)]
    pub scripts: Option<BTreeMap<String, String>>,
    /// Workspace glob patterns (root manifest only)
    #[serde(default)]
    pub workspaces: Option<WorkspaceDeclarations>,
}

impl Manifest {
    /// Parse a manifest from JSON text. `path` is only used for error messages.
    ///
    /// # Errors
    /// Returns [`Error::Json`] when the text is not a valid manifest.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `<dir>/package.json`.
    ///
    /// # Errors
    /// Returns [`Error::Io`] when the file cannot be read and [`Error::Json`]
    /// when it cannot be parsed.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    /// True when a non-empty command is declared under `script`.
    ///
    /// A missing `scripts` table counts as not declared.
    pub fn has_script(&self, script: &str) -> bool {
        self.scripts
            .as_ref()
            .and_then(|scripts| scripts.get(script))
            .is_some_and(|command| !command.is_empty())
    }

    /// Declared workspace patterns, in declaration order.
    pub fn workspace_patterns(&self) -> &[String] {
        match &self.workspaces {
            Some(WorkspaceDeclarations::List(patterns)) => patterns,
            Some(WorkspaceDeclarations::Packages { packages }) => packages,
            None => &[],
        }
    }

    /// Label for the root target: the package name, or `.` when unnamed.
    pub fn root_label(&self) -> String {
        self.name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ".".to_owned())
    }
}

/// Source of manifests, swappable for tests.
pub trait ManifestReader: Send + Sync {
    /// Read the manifest in `dir`.
    ///
    /// # Errors
    /// Returns an error when the manifest is missing or malformed.
    fn read(&self, dir: &Path) -> Result<Manifest>;
}

/// Reads manifests from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestReader;

impl ManifestReader for FsManifestReader {
    fn read(&self, dir: &Path) -> Result<Manifest> {
        Manifest::from_dir(dir)
    }
}

/// Nearest directory at or above `start` that contains a `package.json`.
///
/// # Errors
/// Returns [`Error::ProjectRootNotFound`] when no ancestor has a manifest.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let start_dir = if start.is_absolute() {
        start.to_path_buf()
    } else {
        absolute(start).map_err(|source| Error::Io {
            path: start.to_path_buf(),
            source,
        })?
    };

    let root = start_dir
        .ancestors()
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf);
    root.ok_or(Error::ProjectRootNotFound(start_dir))
}
