//! Version-control command construction and probing
//!
//! Only three invocations exist: a version query (probe), an update of an
//! existing checkout, and a fresh checkout of a remote URL.

pub mod diagnostics;
pub mod runner;

pub use diagnostics::{classify_diagnostic_text, DiagnosticVerdict};
pub use runner::{ExecLimits, GitCommand, GitOutput, GitRunner, ProcessGitRunner, RunError};

use crate::cancel::CancelToken;
use crate::config::schema::GitConfig;
use crate::identity::RepositoryIdentity;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Name of the metadata directory marking a real checkout
pub const METADATA_DIR: &str = ".git";

/// Remote URL for a repository on `host`
pub fn remote_url(host: &str, identity: &RepositoryIdentity) -> String {
    format!("https://{}/{}/{}.git", host, identity.owner(), identity.name())
}

/// Whether `path` already holds a checkout
pub fn has_checkout(path: &Path) -> bool {
    path.join(METADATA_DIR).is_dir()
}

pub fn version_command(config: &GitConfig) -> GitCommand {
    GitCommand::new(
        ["--version"],
        ExecLimits {
            timeout: config.probe_timeout(),
            max_output_bytes: config.probe_max_output_bytes,
        },
    )
}

pub fn update_command(config: &GitConfig, path: &Path) -> GitCommand {
    GitCommand::new(
        [OsString::from("-C"), path.as_os_str().to_owned(), OsString::from("pull")],
        ExecLimits {
            timeout: config.update_timeout(),
            max_output_bytes: config.update_max_output_bytes,
        },
    )
}

pub fn clone_command(config: &GitConfig, url: &str, path: &Path) -> GitCommand {
    GitCommand::new(
        [OsString::from("clone"), OsString::from(url), path.as_os_str().to_owned()],
        ExecLimits {
            timeout: config.clone_timeout(),
            max_output_bytes: config.clone_max_output_bytes,
        },
    )
}

/// Outcome of a version-query probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Available(String),
    Unavailable(String),
    Cancelled,
}

impl ProbeResult {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Check whether the executable answers a version query in time
pub async fn probe(runner: &dyn GitRunner, config: &GitConfig, cancel: &CancelToken) -> ProbeResult {
    let result = match runner.run(&version_command(config), cancel).await {
        Ok(output) if output.success => ProbeResult::Available(output.stdout.trim().to_string()),
        Ok(output) => ProbeResult::Unavailable(output.failure_text()),
        Err(RunError::Cancelled) => ProbeResult::Cancelled,
        Err(e) => ProbeResult::Unavailable(e.to_string()),
    };
    debug!("git probe: {:?}", result);
    result
}
