//! Run configuration snapshot.
//!
//! [`RunOptions`] is built once per invocation (by the CLI or by a test) and
//! never mutated afterwards.

use core::fmt;
use core::str::FromStr;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::filter::FilterRules;

/// Display mode for task progress.
///
/// The tag is opaque to scheduling: it only selects a renderer and decides
/// whether successful units have their buffered output flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Interactive progress view
    #[default]
    Default,
    /// Every unit's output is printed, successful or not
    Verbose,
    /// One line per settled unit, suited to logs without a terminal
    Simple,
    /// Nothing is rendered
    Silent,
}

impl RenderMode {
    /// All modes, in the order they are listed in help text.
    pub const ALL: [Self; 4] = [Self::Default, Self::Verbose, Self::Simple, Self::Silent];

    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Simple => "simple",
            Self::Silent => "silent",
        }
    }

    /// Whether buffered output of successful units is flushed.
    ///
    /// Failed units always have their output flushed.
    pub fn shows_success_output(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                format!("unknown renderer '{value}', expected one of: default, verbose, simple, silent")
            })
    }
}

/// Immutable configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag is an independent command-line switch"
)]
pub struct RunOptions {
    /// Directory inside the project; the project root is searched from here
    pub directory: PathBuf,
    /// Workspaces to run on, by relative path or basename (empty means all)
    pub include: Vec<String>,
    /// Workspaces to skip, by relative path or basename
    pub exclude: Vec<String>,
    /// Only run the script where the manifest declares it
    pub if_present: bool,
    /// Run the script on the project root as well
    pub include_root: bool,
    /// Display mode chosen by the user, `None` when nothing was chosen
    pub renderer: Option<RenderMode>,
    /// Display mode used under CI when `renderer` is unset
    pub ci_render_mode: RenderMode,
    /// Forward child output live instead of buffering it
    pub stream: bool,
    /// Cap concurrency to the number of processing units
    pub throttle: bool,
    /// Run units one at a time, in order
    pub serial: bool,
    /// Script to run
    pub script: Option<String>,
    /// Print the filtered workspace list and exit
    pub list_workspaces: bool,
    /// Pass `--ignore-scripts` to the package manager
    pub ignore_scripts: bool,
    /// Build and render units without executing anything
    pub dry_run: bool,
    /// Package manager program
    pub npm_path: String,
}

impl RunOptions {
    /// Package manager used when none is configured.
    pub const DEFAULT_NPM: &'static str = "npm";

    /// Create options for `script` with everything else at its default.
    #[must_use]
    pub fn for_script(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            ..Self::default()
        }
    }

    /// Set the project directory.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Display mode after CI escalation.
    ///
    /// An explicit choice always wins. Without one, CI gets
    /// [`RunOptions::ci_render_mode`] and everything else gets
    /// [`RenderMode::Default`].
    pub fn effective_render_mode(&self, is_ci: bool) -> RenderMode {
        match self.renderer {
            Some(mode) => mode,
            None if is_ci => self.ci_render_mode,
            None => RenderMode::Default,
        }
    }

    /// Include/exclude rules for the filter stage.
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules::new(self.include.clone(), self.exclude.clone())
    }

    /// Script name, if present and non-empty.
    pub fn script_name(&self) -> Option<&str> {
        self.script.as_deref().filter(|name| !name.is_empty())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            directory: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            include: Vec::new(),
            exclude: Vec::new(),
            if_present: false,
            include_root: false,
            renderer: None,
            ci_render_mode: RenderMode::Simple,
            stream: false,
            throttle: false,
            serial: false,
            script: None,
            list_workspaces: false,
            ignore_scripts: false,
            dry_run: false,
            npm_path: Self::DEFAULT_NPM.to_owned(),
        }
    }
}
