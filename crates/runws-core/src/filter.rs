//! Include/exclude filtering of workspace lists.
//!
//! A rule matches a workspace when it equals either the full relative path
//! or the final path segment.

use std::ffi::OsStr;
use std::path::Path;

/// Include and exclude rules applied to a resolved workspace list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FilterRules {
    /// Create rules from include and exclude lists.
    #[must_use]
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether any rule is set.
    pub fn is_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    /// True when `include` is empty or some include rule matches.
    pub fn is_included(&self, workspace: &str) -> bool {
        self.include.is_empty() || Self::matches_any(&self.include, workspace)
    }

    /// True when some exclude rule matches.
    pub fn is_excluded(&self, workspace: &str) -> bool {
        Self::matches_any(&self.exclude, workspace)
    }

    /// Included and not excluded.
    pub fn retains(&self, workspace: &str) -> bool {
        self.is_included(workspace) && !self.is_excluded(workspace)
    }

    /// Retained subset of `workspaces`, in original order.
    pub fn apply<T: AsRef<str>>(&self, workspaces: Vec<T>) -> Vec<T> {
        if !self.is_active() {
            return workspaces;
        }
        workspaces
            .into_iter()
            .filter(|workspace| self.retains(workspace.as_ref()))
            .collect()
    }

    fn matches_any(rules: &[String], workspace: &str) -> bool {
        let basename = Path::new(workspace)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(workspace);
        rules
            .iter()
            .any(|rule| rule == workspace || rule == basename)
    }
}
