//! Error types for Bugsmith
//!
//! All modules use `BugsmithResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Bugsmith operations
pub type BugsmithResult<T> = Result<T, BugsmithError>;

/// Coarse error category, stable across message wording changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed repository identifier (caller's fault)
    InvalidIdentity,
    /// Directory creation or file write failed
    Filesystem,
    /// The version-control executable cannot be invoked
    ToolUnavailable,
    /// Checkout failed for a reason other than tool absence
    Acquisition,
    /// The calling context cancelled the operation
    Cancelled,
    /// Configuration could not be loaded, saved or validated
    Config,
}

/// All errors that can occur in Bugsmith
#[derive(Error, Debug)]
pub enum BugsmithError {
    // Input errors
    #[error("Invalid repository identifier '{input}': {reason}")]
    InvalidIdentity { input: String, reason: &'static str },

    // Filesystem errors
    #[error("Filesystem error while {context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Acquisition errors
    #[error("Cannot acquire {repo}: git is not available ({reason})")]
    ToolUnavailable { repo: String, reason: String },

    #[error("Failed to acquire {repo}: {cause}")]
    Acquisition { repo: String, cause: String },

    #[error("Acquisition of {repo} was cancelled")]
    Cancelled { repo: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl BugsmithError {
    /// Create a filesystem error with context
    pub fn filesystem(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Create a tool-unavailable error for a repository
    pub fn tool_unavailable(repo: impl ToString, reason: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            repo: repo.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an acquisition error wrapping the underlying cause text
    pub fn acquisition(repo: impl ToString, cause: impl Into<String>) -> Self {
        Self::Acquisition {
            repo: repo.to_string(),
            cause: cause.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(repo: impl ToString) -> Self {
        Self::Cancelled {
            repo: repo.to_string(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentity { .. } => ErrorKind::InvalidIdentity,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::Acquisition { .. } => ErrorKind::Acquisition,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::ConfigInvalid { .. }
            | Self::ConfigDirCreate { .. }
            | Self::Json(_)
            | Self::TomlSerialize(_) => ErrorKind::Config,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIdentity { .. } => Some("Use the form <owner>/<name>, e.g. octocat/Hello-World"),
            Self::ToolUnavailable { .. } => Some("Install git and make sure it is on PATH (or set git.binary)"),
            Self::ConfigInvalid { .. } => Some("Run: bugsmith config show"),
            _ => None,
        }
    }
}
