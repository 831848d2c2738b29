use std::path::PathBuf;

use clap::{ArgAction, Parser};
use runws_core::{RenderMode, RunOptions};

/// Command-line arguments for `runws`.
///
/// Every option may also be set through the `RUNWS_*` variable named in its
/// help text. List options accept repeated flags, `--flag=value` and
/// comma-separated values alike.
#[derive(Debug, Parser)]
#[command(name = "runws")]
#[command(
    about = "Run an npm script across every workspace of a project",
    long_about = None,
    version,
    disable_version_flag = true
)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag is an independent command-line switch"
)]
pub struct Cli {
    #[arg(help = "The npm script to run in each workspace")]
    pub script: Option<String>,

    #[arg(
        short,
        long,
        env = "RUNWS_DIRECTORY",
        default_value = ".",
        help = "Directory inside the project to start from"
    )]
    pub directory: PathBuf,

    #[arg(
        short,
        long,
        env = "RUNWS_INCLUDE",
        value_delimiter = ',',
        help = "Only run on these workspaces, by path or basename"
    )]
    pub include: Vec<String>,

    #[arg(
        short,
        long,
        env = "RUNWS_EXCLUDE",
        value_delimiter = ',',
        help = "Skip these workspaces, by path or basename"
    )]
    pub exclude: Vec<String>,

    #[arg(long, env = "RUNWS_IF_PRESENT", help = "Skip workspaces that do not declare the script")]
    pub if_present: bool,

    #[arg(long, env = "RUNWS_INCLUDE_ROOT", help = "Also run the script on the project root")]
    pub include_root: bool,

    #[arg(
        short,
        long,
        env = "RUNWS_RENDERER",
        conflicts_with_all = ["verbose", "quiet", "interactive"],
        help = "Display mode: default, verbose, simple or silent"
    )]
    pub renderer: Option<RenderMode>,

    #[arg(
        short = 'V',
        long,
        conflicts_with_all = ["quiet", "interactive"],
        help = "Print the output of every command (same as --renderer verbose)"
    )]
    pub verbose: bool,

    #[arg(
        short,
        long,
        conflicts_with = "interactive",
        help = "Print nothing while running (same as --renderer silent)"
    )]
    pub quiet: bool,

    #[arg(long, help = "Use the interactive progress view (same as --renderer default)")]
    pub interactive: bool,

    #[arg(
        long,
        env = "RUNWS_CI_RENDERER",
        default_value_t = RenderMode::Simple,
        help = "Display mode used under CI when none is chosen"
    )]
    pub ci_renderer: RenderMode,

    #[arg(long, env = "RUNWS_STREAM", help = "Stream output as it is produced")]
    pub stream: bool,

    #[arg(long, env = "RUNWS_THROTTLE", help = "Run at most one command per CPU at a time")]
    pub throttle: bool,

    #[arg(
        short,
        long,
        env = "RUNWS_SERIAL",
        help = "Run commands one at a time, in order"
    )]
    pub serial: bool,

    #[arg(long, help = "Print the selected workspaces and exit")]
    pub list_workspaces: bool,

    #[arg(long, env = "RUNWS_IGNORE_SCRIPTS", help = "Pass --ignore-scripts to npm")]
    pub ignore_scripts: bool,

    #[arg(long, env = "RUNWS_DRY_RUN", help = "Show the commands without running them")]
    pub dry_run: bool,

    #[arg(
        long,
        env = "RUNWS_NPM",
        default_value = RunOptions::DEFAULT_NPM,
        help = "Package manager program to invoke"
    )]
    pub npm_path: String,

    #[arg(short = 'v', long, action = ArgAction::Version, help = "Print version")]
    pub version: Option<bool>,
}

impl Cli {
    /// Display mode chosen on the command line, if any.
    pub fn render_mode(&self) -> Option<RenderMode> {
        if self.verbose {
            Some(RenderMode::Verbose)
        } else if self.quiet {
            Some(RenderMode::Silent)
        } else if self.interactive {
            Some(RenderMode::Default)
        } else {
            self.renderer
        }
    }

    /// Freeze the arguments into run options.
    pub fn into_options(self) -> RunOptions {
        RunOptions {
            renderer: self.render_mode(),
            directory: self.directory,
            include: self.include,
            exclude: self.exclude,
            if_present: self.if_present,
            include_root: self.include_root,
            ci_render_mode: self.ci_renderer,
            stream: self.stream,
            throttle: self.throttle,
            serial: self.serial,
            script: self.script,
            list_workspaces: self.list_workspaces,
            ignore_scripts: self.ignore_scripts,
            dry_run: self.dry_run,
            npm_path: self.npm_path,
        }
    }
}
