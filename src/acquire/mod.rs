//! Repository acquisition
//!
//! Composes the pipeline for one call:
//! identifier → [`RepositoryIdentity`] → [`EnvironmentProfile`] →
//! cache directory → [`AcquisitionEngine`].
//!
//! The environment is classified fresh on every call. Calls for the same
//! cache directory are serialized through [`PathLocks`]; calls for
//! different repositories run independently.

mod engine;

pub use engine::{AcquireOutcome, AcquisitionEngine};

use crate::cache::{CachePathResolver, PathLocks};
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::environment::{EnvSnapshot, EnvironmentClassifier, EnvironmentProfile};
use crate::error::{BugsmithError, BugsmithResult};
use crate::git::{GitRunner, ProcessGitRunner};
use crate::identity::RepositoryIdentity;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Result of a successful acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredRepository {
    pub identity: RepositoryIdentity,
    pub path: PathBuf,
    pub outcome: AcquireOutcome,
}

impl AcquiredRepository {
    pub fn is_placeholder(&self) -> bool {
        self.outcome == AcquireOutcome::Placeholder
    }
}

/// JSON view printed by the CLI
#[derive(Debug, Serialize)]
pub struct AcquiredSummary {
    pub repo: String,
    pub path: PathBuf,
    pub degraded: bool,
}

impl From<&AcquiredRepository> for AcquiredSummary {
    fn from(acquired: &AcquiredRepository) -> Self {
        Self {
            repo: acquired.identity.to_string(),
            path: acquired.path.clone(),
            degraded: acquired.is_placeholder(),
        }
    }
}

/// Where environment inputs come from
#[derive(Debug, Clone)]
enum EnvSource {
    /// Re-read the process environment on every call
    Process,
    Fixed(EnvSnapshot),
}

/// Acquires repositories into the local cache
pub struct Acquirer {
    config: Config,
    env: EnvSource,
    resolver: Option<CachePathResolver>,
    runner: Arc<dyn GitRunner>,
    locks: PathLocks,
}

impl Acquirer {
    /// Acquirer backed by the real process environment and git executable
    pub fn new(config: Config) -> Self {
        let runner = Arc::new(ProcessGitRunner::new(config.git.binary.clone()));
        Self {
            config,
            env: EnvSource::Process,
            resolver: None,
            runner,
            locks: PathLocks::new(),
        }
    }

    /// Use a fixed environment snapshot instead of the process environment
    pub fn with_snapshot(mut self, snapshot: EnvSnapshot) -> Self {
        self.env = EnvSource::Fixed(snapshot);
        self
    }

    /// Use a fixed cache path resolver
    pub fn with_resolver(mut self, resolver: CachePathResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use a different git runner
    pub fn with_runner(mut self, runner: Arc<dyn GitRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current environment inputs
    pub fn snapshot(&self) -> EnvSnapshot {
        match &self.env {
            EnvSource::Process => EnvSnapshot::capture(&self.config.environment),
            EnvSource::Fixed(snapshot) => snapshot.clone(),
        }
    }

    pub fn resolver(&self, snapshot: &EnvSnapshot) -> CachePathResolver {
        self.resolver
            .clone()
            .unwrap_or_else(|| CachePathResolver::from_env(snapshot, &self.config.cache))
    }

    /// Classify the current environment
    pub async fn classify(&self, snapshot: &EnvSnapshot, cancel: &CancelToken) -> EnvironmentProfile {
        EnvironmentClassifier::new(
            snapshot,
            &self.config.environment,
            &self.config.git,
            self.runner.as_ref(),
        )
        .classify(cancel)
        .await
    }

    /// Acquire `identifier` (`<owner>/<name>`) and return its cache directory
    pub async fn acquire(&self, identifier: &str, cancel: &CancelToken) -> BugsmithResult<AcquiredRepository> {
        let identity = RepositoryIdentity::parse(identifier)?;
        if cancel.is_cancelled() {
            return Err(BugsmithError::cancelled(&identity));
        }

        let snapshot = self.snapshot();
        let profile = self.classify(&snapshot, cancel).await;
        if cancel.is_cancelled() {
            return Err(BugsmithError::cancelled(&identity));
        }
        debug!("Environment for {}: {:?}", identity, profile);

        let resolver = self.resolver(&snapshot);
        let path = resolver.resolve(&identity, profile.is_degraded).await?;

        let _guard = self.locks.lock(&path).await;
        let (path, outcome) = AcquisitionEngine::new(self.runner.as_ref(), &self.config.git)
            .acquire_with_outcome(&identity, &profile, &path, cancel)
            .await?;

        Ok(AcquiredRepository {
            identity,
            path,
            outcome,
        })
    }
}
