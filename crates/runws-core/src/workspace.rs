//! Workspace resolution.
//!
//! Expands the root manifest's workspace patterns into workspace directories
//! relative to the project root.

use std::path::Path;

use glob::{Pattern, glob};

use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_FILE, Manifest};

/// Resolve the workspace list declared by `manifest`.
///
/// Patterns are expanded in declaration order and each pattern's matches in
/// filesystem (sorted) order. A directory only counts when it contains a
/// `package.json`. Duplicates keep their first position. A pattern that
/// matches nothing is skipped.
///
/// # Errors
/// Returns [`Error::Glob`] when a declaration is not a valid glob pattern.
pub fn resolve_workspaces(manifest: Option<&Manifest>, base_dir: &Path) -> Result<Vec<String>> {
    let Some(manifest) = manifest else {
        return Ok(Vec::new());
    };

    let escaped_base = Pattern::escape(&base_dir.to_string_lossy());
    let mut workspaces: Vec<String> = Vec::new();

    for declared in manifest.workspace_patterns() {
        let normalized = normalize_pattern(declared);
        if normalized.is_empty() {
            continue;
        }

        let full_pattern = format!("{escaped_base}/{normalized}/{MANIFEST_FILE}");
        let matches = glob(&full_pattern).map_err(|source| Error::Glob {
            pattern: declared.clone(),
            source,
        })?;

        let mut matched_any = false;
        for entry in matches {
            let manifest_path = match entry {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!("Skipping unreadable workspace path: {err}");
                    continue;
                }
            };
            let Some(relative) = manifest_path
                .parent()
                .and_then(|dir| dir.strip_prefix(base_dir).ok())
            else {
                continue;
            };
            let relative = relative.to_string_lossy().into_owned();
            matched_any = true;
            if !relative.is_empty() && !workspaces.contains(&relative) {
                workspaces.push(relative);
            }
        }

        if !matched_any {
            tracing::debug!("Workspace pattern '{declared}' matched no manifests");
        }
    }

    Ok(workspaces)
}

fn normalize_pattern(pattern: &str) -> &str {
    let mut trimmed = pattern.trim();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_workspace(root: &Path, dir: &str) {
        let full = root.join(dir);
        fs::create_dir_all(&full).unwrap();
        let name = Path::new(dir).file_name().unwrap().to_string_lossy().into_owned();
        fs::write(full.join(MANIFEST_FILE), format!(r#"{{"name":"{name}"}}"#)).unwrap();
    }

    fn manifest_with(patterns: &[&str]) -> Manifest {
        let list = patterns
            .iter()
            .map(|pattern| format!("\"{pattern}\""))
            .collect::<Vec<_>>()
            .join(",");
        Manifest::parse(&format!(r#"{{"name":"root","workspaces":[{list}]}}"#), Path::new("x"))
            .unwrap()
    }

    #[test]
    fn test_finds_workspaces_using_star() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        create_workspace(temp.path(), "workspaces/a");
        create_workspace(temp.path(), "workspaces/b");
        create_workspace(temp.path(), "workspaces/c");

        let found = resolve_workspaces(Some(&manifest_with(&["workspaces/*"])), temp.path()).unwrap();
        assert_eq!(found, vec!["workspaces/a", "workspaces/b", "workspaces/c"]);
    }

    #[test]
    fn test_finds_workspace_using_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        create_workspace(temp.path(), "tools/cli");

        let found = resolve_workspaces(Some(&manifest_with(&["./tools/cli/"])), temp.path()).unwrap();
        assert_eq!(found, vec!["tools/cli"]);
    }

    #[test]
    fn test_declaration_order_and_dedup() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        create_workspace(temp.path(), "workspaces/a");
        create_workspace(temp.path(), "workspaces/b");
        create_workspace(temp.path(), "workspaces2/d");

        let manifest = manifest_with(&["workspaces2/*", "workspaces/b", "workspaces/*"]);
        let found = resolve_workspaces(Some(&manifest), temp.path()).unwrap();
        assert_eq!(found, vec!["workspaces2/d", "workspaces/b", "workspaces/a"]);
    }

    #[test]
    fn test_empty_inputs_yield_empty_list() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        assert!(resolve_workspaces(None, temp.path()).unwrap().is_empty());
        assert!(resolve_workspaces(Some(&Manifest::default()), temp.path()).unwrap().is_empty());
        assert!(resolve_workspaces(Some(&manifest_with(&[])), temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        create_workspace(temp.path(), "workspaces/a");

        let manifest = manifest_with(&["missing/*", "workspaces/*"]);
        let found = resolve_workspaces(Some(&manifest), temp.path()).unwrap();
        assert_eq!(found, vec!["workspaces/a"]);
    }

    #[test]
    fn test_directory_without_manifest_is_ignored() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        create_workspace(temp.path(), "workspaces/a");
        fs::create_dir_all(temp.path().join("workspaces/no-manifest")).unwrap();

        let found = resolve_workspaces(Some(&manifest_with(&["workspaces/*"])), temp.path()).unwrap();
        assert_eq!(found, vec!["workspaces/a"]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = resolve_workspaces(Some(&manifest_with(&["packages/[*"])), temp.path()).unwrap_err();
        assert!(matches!(err, Error::Glob { .. }));
    }
}
