//! Acquisition state machine
//!
//! ```text
//! Start ──degraded──▶ write marker ─────────────────────────▶ DegradedDone
//!   │
//!   └─capable─▶ has .git? ──yes──▶ UpdateAttempt ──ok──────▶ Done
//!                  │                    │ failed (warn, keep dir)
//!                  no                   ▼
//!                  └──────────────▶ CloneAttempt ──ok──────▶ Done
//!                                       └──failed─────────▶ Failed
//! ```
//!
//! The only recovery is the single update→clone fallback. An existing
//! directory is never deleted.

use crate::cache::ServerlessMarker;
use crate::cancel::CancelToken;
use crate::config::schema::GitConfig;
use crate::environment::EnvironmentProfile;
use crate::error::{BugsmithError, BugsmithResult};
use crate::git::{self, classify_diagnostic_text, GitRunner, ProbeResult, RunError};
use crate::identity::RepositoryIdentity;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a successful acquisition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Degraded host: marker written, nothing fetched
    Placeholder,
    /// Existing checkout updated in place
    Updated,
    /// Fresh checkout
    Cloned,
}

pub struct AcquisitionEngine<'a> {
    runner: &'a dyn GitRunner,
    git: &'a GitConfig,
}

impl<'a> AcquisitionEngine<'a> {
    pub fn new(runner: &'a dyn GitRunner, git: &'a GitConfig) -> Self {
        Self { runner, git }
    }

    /// Populate `path` and return it
    pub async fn acquire(
        &self,
        identity: &RepositoryIdentity,
        profile: &EnvironmentProfile,
        path: &Path,
        cancel: &CancelToken,
    ) -> BugsmithResult<PathBuf> {
        self.acquire_with_outcome(identity, profile, path, cancel)
            .await
            .map(|(path, _)| path)
    }

    pub async fn acquire_with_outcome(
        &self,
        identity: &RepositoryIdentity,
        profile: &EnvironmentProfile,
        path: &Path,
        cancel: &CancelToken,
    ) -> BugsmithResult<(PathBuf, AcquireOutcome)> {
        if profile.is_degraded {
            ServerlessMarker::new(identity).write(path).await?;
            info!("Degraded environment, wrote placeholder for {}", identity);
            return Ok((path.to_path_buf(), AcquireOutcome::Placeholder));
        }

        let mut update_failure = None;
        if git::has_checkout(path) {
            let command = git::update_command(self.git, path);
            let failure = match self.runner.run(&command, cancel).await {
                Ok(output) if output.success => {
                    info!("Updated {} in {}", identity, path.display());
                    return Ok((path.to_path_buf(), AcquireOutcome::Updated));
                }
                Ok(output) => output.failure_text(),
                Err(RunError::Cancelled) => return Err(BugsmithError::cancelled(identity)),
                Err(e) => e.to_string(),
            };
            warn!(
                "Updating {} failed ({}), falling back to a fresh clone",
                identity, failure
            );
            update_failure = Some(failure);
        }

        self.clone_into(identity, path, cancel)
            .await
            .map_err(|e| match (e, update_failure) {
                (BugsmithError::Acquisition { repo, cause }, Some(update)) => BugsmithError::Acquisition {
                    repo,
                    cause: format!("update failed: {update}; clone failed: {cause}"),
                },
                (e, _) => e,
            })?;
        info!("Cloned {} into {}", identity, path.display());
        Ok((path.to_path_buf(), AcquireOutcome::Cloned))
    }

    async fn clone_into(
        &self,
        identity: &RepositoryIdentity,
        path: &Path,
        cancel: &CancelToken,
    ) -> BugsmithResult<()> {
        match git::probe(self.runner, self.git, cancel).await {
            ProbeResult::Available(version) => debug!("Using {}", version),
            ProbeResult::Unavailable(reason) => {
                return Err(BugsmithError::tool_unavailable(identity, reason))
            }
            ProbeResult::Cancelled => return Err(BugsmithError::cancelled(identity)),
        }

        if ServerlessMarker::clear_stale(path).await? {
            debug!("Removed placeholder marker from {}", path.display());
        }

        let url = git::remote_url(&self.git.host, identity);
        let command = git::clone_command(self.git, &url, path);
        let output = match self.runner.run(&command, cancel).await {
            Ok(output) => output,
            Err(RunError::Cancelled) => return Err(BugsmithError::cancelled(identity)),
            Err(RunError::NotFound(binary)) => {
                return Err(BugsmithError::tool_unavailable(
                    identity,
                    format!("executable not found: {}", binary.display()),
                ))
            }
            Err(e) => return Err(BugsmithError::acquisition(identity, e.to_string())),
        };

        if output.truncated {
            debug!("Clone output for {} exceeded the buffer and was truncated", identity);
        }

        if !output.success {
            return Err(BugsmithError::acquisition(identity, output.failure_text()));
        }
        if classify_diagnostic_text(&output.stderr).is_error {
            return Err(BugsmithError::acquisition(identity, output.stderr.trim()));
        }

        Ok(())
    }
}
