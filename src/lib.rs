//! Bugsmith - repository acquisition cache
//!
//! Acquires a named repository into a deterministic local cache directory.
//! On hosts that cannot run git (serverless functions, read-only or
//! ephemeral filesystems) it records a placeholder marker instead so
//! callers can switch to an API-based fallback.

pub mod acquire;
pub mod cache;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod git;
pub mod identity;
pub mod ui;

pub use acquire::{AcquiredRepository, Acquirer};
pub use error::{BugsmithError, BugsmithResult, ErrorKind};
pub use identity::RepositoryIdentity;
