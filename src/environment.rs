//! Execution environment classification
//!
//! Decides whether this process can run real version-control operations.
//! Cheap environment-variable heuristics run first; only when none of them
//! trip is the executable probed.

use crate::cancel::CancelToken;
use crate::config::schema::{EnvironmentConfig, GitConfig};
use crate::git::{self, GitRunner, ProbeResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Temp-dir variable on Unix-like hosts
pub const TMPDIR_VAR: &str = "TMPDIR";
/// Temp-dir variable Windows conventionally provides
pub const TEMP_VAR: &str = "TEMP";

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Other,
}

impl HostOs {
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Snapshot of the environment inputs the classifier and resolver consult
///
/// Captured once and passed in explicitly so tests never have to mutate the
/// real process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    os: HostOs,
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Empty snapshot for the given OS
    pub fn new(os: HostOs) -> Self {
        Self {
            os,
            vars: HashMap::new(),
        }
    }

    /// Capture the relevant variables from the current process
    pub fn capture(names: &EnvironmentConfig) -> Self {
        let mut snapshot = Self::new(HostOs::detect());
        for name in [
            names.serverless_var.as_str(),
            names.function_name_var.as_str(),
            names.platform_env_var.as_str(),
            TMPDIR_VAR,
            TEMP_VAR,
        ] {
            if let Ok(value) = std::env::var(name) {
                snapshot.vars.insert(name.to_string(), value);
            }
        }
        snapshot
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn os(&self) -> HostOs {
        self.os
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Present and not one of the conventional false values
    pub fn is_truthy(&self, name: &str) -> bool {
        match self.var(name).map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(value) => !value.eq_ignore_ascii_case("false"),
        }
    }
}

/// Why a host was classified as degraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedReason {
    ServerlessFlag { var: String },
    FunctionName { var: String },
    PlatformTag { var: String },
    MissingTempDir,
    ProbeFailed { detail: String },
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerlessFlag { var } => write!(f, "serverless flag {var} is set"),
            Self::FunctionName { var } => write!(f, "serverless function variable {var} is set"),
            Self::PlatformTag { var } => write!(f, "platform environment variable {var} is set"),
            Self::MissingTempDir => write!(f, "no {TMPDIR_VAR} or {TEMP_VAR} on a non-Windows host"),
            Self::ProbeFailed { detail } => write!(f, "git probe failed: {detail}"),
        }
    }
}

/// Result of classification, computed fresh for every acquisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfile {
    pub is_degraded: bool,
    pub reason: Option<DegradedReason>,
}

impl EnvironmentProfile {
    pub fn capable() -> Self {
        Self {
            is_degraded: false,
            reason: None,
        }
    }

    pub fn degraded(reason: DegradedReason) -> Self {
        Self {
            is_degraded: true,
            reason: Some(reason),
        }
    }
}

/// Environment heuristics alone, without spawning anything
pub fn heuristic_reason(snapshot: &EnvSnapshot, names: &EnvironmentConfig) -> Option<DegradedReason> {
    if snapshot.is_truthy(&names.serverless_var) {
        return Some(DegradedReason::ServerlessFlag {
            var: names.serverless_var.clone(),
        });
    }
    if snapshot.is_set(&names.function_name_var) {
        return Some(DegradedReason::FunctionName {
            var: names.function_name_var.clone(),
        });
    }
    if snapshot.is_set(&names.platform_env_var) {
        return Some(DegradedReason::PlatformTag {
            var: names.platform_env_var.clone(),
        });
    }
    if !snapshot.is_set(TMPDIR_VAR) && !snapshot.is_set(TEMP_VAR) && snapshot.os() != HostOs::Windows {
        return Some(DegradedReason::MissingTempDir);
    }
    None
}

/// Classifies the host as capable or degraded
pub struct EnvironmentClassifier<'a> {
    snapshot: &'a EnvSnapshot,
    names: &'a EnvironmentConfig,
    git: &'a GitConfig,
    runner: &'a dyn GitRunner,
}

impl<'a> EnvironmentClassifier<'a> {
    pub fn new(
        snapshot: &'a EnvSnapshot,
        names: &'a EnvironmentConfig,
        git: &'a GitConfig,
        runner: &'a dyn GitRunner,
    ) -> Self {
        Self {
            snapshot,
            names,
            git,
            runner,
        }
    }

    /// Never fails: any probe failure counts as degraded
    pub async fn classify(&self, cancel: &CancelToken) -> EnvironmentProfile {
        if let Some(reason) = heuristic_reason(self.snapshot, self.names) {
            debug!("Degraded environment: {}", reason);
            return EnvironmentProfile::degraded(reason);
        }

        match git::probe(self.runner, self.git, cancel).await {
            ProbeResult::Available(_) => EnvironmentProfile::capable(),
            ProbeResult::Unavailable(detail) => {
                EnvironmentProfile::degraded(DegradedReason::ProbeFailed { detail })
            }
            ProbeResult::Cancelled => EnvironmentProfile::degraded(DegradedReason::ProbeFailed {
                detail: "cancelled".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{failed, version, StubRunner};
    use crate::git::RunError;
    use serial_test::serial;
    use std::path::PathBuf;

    fn names() -> EnvironmentConfig {
        EnvironmentConfig::default()
    }

    fn unix_with_tmp() -> EnvSnapshot {
        EnvSnapshot::new(HostOs::Other).with_var(TMPDIR_VAR, "/tmp")
    }

    async fn classify(snapshot: &EnvSnapshot, runner: &StubRunner) -> EnvironmentProfile {
        let names = names();
        let git = GitConfig::default();
        EnvironmentClassifier::new(snapshot, &names, &git, runner)
            .classify(&CancelToken::never())
            .await
    }

    #[test]
    fn truthiness() {
        let snapshot = EnvSnapshot::new(HostOs::Other)
            .with_var("A", "1")
            .with_var("B", "0")
            .with_var("C", "FALSE")
            .with_var("D", "")
            .with_var("E", "yes");
        assert!(snapshot.is_truthy("A"));
        assert!(!snapshot.is_truthy("B"));
        assert!(!snapshot.is_truthy("C"));
        assert!(!snapshot.is_truthy("D"));
        assert!(snapshot.is_truthy("E"));
        assert!(!snapshot.is_truthy("MISSING"));
    }

    #[tokio::test]
    async fn serverless_flag_short_circuits_probe() {
        let runner = StubRunner::with_results(vec![version()]);
        let snapshot = unix_with_tmp().with_var("VERCEL", "1");

        let profile = classify(&snapshot, &runner).await;

        assert!(profile.is_degraded);
        assert_eq!(
            profile.reason,
            Some(DegradedReason::ServerlessFlag {
                var: "VERCEL".to_string()
            })
        );
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn falsy_serverless_flag_is_ignored() {
        let runner = StubRunner::with_results(vec![version()]);
        let snapshot = unix_with_tmp().with_var("VERCEL", "0");

        let profile = classify(&snapshot, &runner).await;

        assert!(!profile.is_degraded);
        assert_eq!(runner.verbs(), vec!["--version"]);
    }

    #[tokio::test]
    async fn function_name_presence_is_enough() {
        let runner = StubRunner::with_results(vec![]);
        let snapshot = unix_with_tmp().with_var("AWS_LAMBDA_FUNCTION_NAME", "");

        let profile = classify(&snapshot, &runner).await;

        assert!(profile.is_degraded);
        assert!(matches!(profile.reason, Some(DegradedReason::FunctionName { .. })));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn platform_tag_degrades() {
        let runner = StubRunner::with_results(vec![]);
        let snapshot = unix_with_tmp().with_var("VERCEL_ENV", "production");

        let profile = classify(&snapshot, &runner).await;

        assert!(matches!(profile.reason, Some(DegradedReason::PlatformTag { .. })));
    }

    #[tokio::test]
    async fn missing_temp_vars_degrade_non_windows_only() {
        let runner = StubRunner::with_results(vec![version()]);

        let profile = classify(&EnvSnapshot::new(HostOs::Other), &runner).await;
        assert_eq!(profile.reason, Some(DegradedReason::MissingTempDir));
        assert!(runner.calls().is_empty());

        let profile = classify(&EnvSnapshot::new(HostOs::Windows), &runner).await;
        assert!(!profile.is_degraded);
        assert_eq!(runner.verbs(), vec!["--version"]);
    }

    #[tokio::test]
    async fn temp_var_alone_satisfies_heuristic() {
        let runner = StubRunner::with_results(vec![version()]);
        let snapshot = EnvSnapshot::new(HostOs::Other).with_var(TEMP_VAR, "/var/tmp");

        assert!(!classify(&snapshot, &runner).await.is_degraded);
    }

    #[tokio::test]
    async fn failed_probe_degrades() {
        let runner = StubRunner::with_results(vec![
            failed(127, "git: command not found"),
            Err(RunError::NotFound(PathBuf::from("git"))),
            Err(RunError::TimedOut(std::time::Duration::from_secs(2))),
        ]);
        let snapshot = unix_with_tmp();

        for _ in 0..3 {
            let profile = classify(&snapshot, &runner).await;
            assert!(profile.is_degraded);
            assert!(matches!(profile.reason, Some(DegradedReason::ProbeFailed { .. })));
        }
    }

    #[tokio::test]
    async fn custom_variable_names() {
        let runner = StubRunner::with_results(vec![]);
        let names = EnvironmentConfig {
            serverless_var: "NETLIFY".to_string(),
            ..EnvironmentConfig::default()
        };
        let git = GitConfig::default();
        let snapshot = unix_with_tmp().with_var("NETLIFY", "true");

        let profile = EnvironmentClassifier::new(&snapshot, &names, &git, &runner)
            .classify(&CancelToken::never())
            .await;

        assert!(profile.is_degraded);
    }

    #[test]
    #[serial]
    fn capture_reads_process_environment() {
        std::env::set_var("BUGSMITH_TEST_SERVERLESS", "1");
        let names = EnvironmentConfig {
            serverless_var: "BUGSMITH_TEST_SERVERLESS".to_string(),
            ..EnvironmentConfig::default()
        };

        let snapshot = EnvSnapshot::capture(&names);
        std::env::remove_var("BUGSMITH_TEST_SERVERLESS");

        assert_eq!(snapshot.var("BUGSMITH_TEST_SERVERLESS"), Some("1"));
        assert_eq!(snapshot.os(), HostOs::detect());
        assert!(!snapshot.is_set("PATH"));
    }

    #[test]
    fn reason_display() {
        let reason = DegradedReason::ServerlessFlag {
            var: "VERCEL".to_string(),
        };
        assert_eq!(reason.to_string(), "serverless flag VERCEL is set");
    }
}
