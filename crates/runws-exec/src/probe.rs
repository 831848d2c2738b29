//! Environment probes: CI detection and package manager version.

use std::collections::HashMap;
use std::env;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ExecError, ExecResult};

/// Lowest npm major version with workspace support.
pub const MIN_NPM_MAJOR: u64 = 7;

/// Variables whose presence marks a CI environment.
///
/// `CI` is handled separately because some tools set it to `false`.
pub const CI_VARIABLES: [&str; 11] = [
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "RUN_ID",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "CIRCLECI",
    "TRAVIS",
    "TF_BUILD",
    "JENKINS_URL",
    "TEAMCITY_VERSION",
];

/// Detects whether the process runs under continuous integration.
pub trait CiProbe: Send + Sync {
    /// True when running under CI.
    fn is_ci(&self) -> bool;
}

/// [`CiProbe`] over a snapshot of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvCiProbe {
    vars: HashMap<String, String>,
}

impl EnvCiProbe {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Use an explicit set of variables.
    #[must_use]
    pub fn from_vars<Vars, Key, Value>(vars: Vars) -> Self
    where
        Vars: IntoIterator<Item = (Key, Value)>,
        Key: Into<String>,
        Value: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl CiProbe for EnvCiProbe {
    fn is_ci(&self) -> bool {
        let ci_flag = self
            .vars
            .get("CI")
            .is_some_and(|value| !matches!(value.as_str(), "" | "0" | "false"));
        ci_flag || CI_VARIABLES.iter().any(|name| self.vars.contains_key(*name))
    }
}

/// Reports the installed package manager version.
#[async_trait]
pub trait VersionProbe: Send + Sync {
    /// Full version string, e.g. `10.2.4`.
    ///
    /// # Errors
    /// Returns an [`ExecError`] when the package manager cannot be run.
    async fn version(&self) -> ExecResult<String>;
}

/// [`VersionProbe`] that runs `<program> --version`.
#[derive(Debug, Clone)]
pub struct NpmVersionProbe {
    program: String,
}

impl NpmVersionProbe {
    /// Probe `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NpmVersionProbe {
    fn default() -> Self {
        Self::new("npm")
    }
}

#[async_trait]
impl VersionProbe for NpmVersionProbe {
    async fn version(&self) -> ExecResult<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::VersionProbe {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

/// Major component of a version string such as `7.24.0` or `v8`.
///
/// # Errors
/// Returns [`ExecError::VersionParse`] when no leading number is present.
pub fn parse_major(version: &str) -> ExecResult<u64> {
    let trimmed = version.trim();
    let without_prefix = trimmed.strip_prefix('v').unwrap_or(trimmed);
    without_prefix
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
        .ok_or_else(|| ExecError::VersionParse(version.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ci_detected_from_ci_flag() {
        assert!(EnvCiProbe::from_vars([("CI", "true")]).is_ci());
        assert!(EnvCiProbe::from_vars([("CI", "1")]).is_ci());
        assert!(!EnvCiProbe::from_vars([("CI", "false")]).is_ci());
        assert!(!EnvCiProbe::from_vars([("CI", "0")]).is_ci());
    }

    #[test]
    fn test_ci_detected_from_vendor_variables() {
        assert!(EnvCiProbe::from_vars([("GITHUB_ACTIONS", "true")]).is_ci());
        assert!(EnvCiProbe::from_vars([("BUILD_NUMBER", "12")]).is_ci());
        assert!(!EnvCiProbe::from_vars([("HOME", "/root")]).is_ci());
        assert!(!EnvCiProbe::default().is_ci());
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(parse_major("7.24.0").unwrap(), 7);
        assert_eq!(parse_major("10").unwrap(), 10);
        assert_eq!(parse_major("v6.14.4\n").unwrap(), 6);
        assert!(matches!(parse_major("latest"), Err(ExecError::VersionParse(_))));
        assert!(matches!(parse_major(""), Err(ExecError::VersionParse(_))));
    }

    #[tokio::test]
    async fn test_missing_program_fails_probe() {
        let probe = NpmVersionProbe::new("runws-definitely-not-npm");
        assert!(matches!(probe.version().await, Err(ExecError::Spawn { .. })));
    }
}
