//! Deterministic cache directory per repository identity

use crate::config::schema::CacheConfig;
use crate::environment::{EnvSnapshot, HostOs, TEMP_VAR};
use crate::error::{BugsmithError, BugsmithResult};
use crate::identity::RepositoryIdentity;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Temp root used in degraded mode on every OS
pub const UNIVERSAL_TMP_ROOT: &str = "/tmp";

/// Fallback root on Windows when `TEMP` is absent
pub const WINDOWS_DEFAULT_TMP_ROOT: &str = r"C:\Windows\Temp";

/// OS-conventional temp root for non-degraded mode
pub fn os_temp_root(snapshot: &EnvSnapshot) -> PathBuf {
    match snapshot.os() {
        HostOs::Windows => snapshot
            .var(TEMP_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(WINDOWS_DEFAULT_TMP_ROOT)),
        HostOs::Other => PathBuf::from(UNIVERSAL_TMP_ROOT),
    }
}

/// Maps repository identities to cache directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePathResolver {
    native_root: PathBuf,
    degraded_root: PathBuf,
    namespace: String,
}

impl CachePathResolver {
    /// Resolver for the current host
    ///
    /// `cache.root` replaces the OS-conventional root; degraded mode always
    /// uses [`UNIVERSAL_TMP_ROOT`].
    pub fn from_env(snapshot: &EnvSnapshot, cache: &CacheConfig) -> Self {
        Self {
            native_root: cache.root.clone().unwrap_or_else(|| os_temp_root(snapshot)),
            degraded_root: PathBuf::from(UNIVERSAL_TMP_ROOT),
            namespace: cache.namespace.clone(),
        }
    }

    /// Resolver with explicit roots
    pub fn with_roots(
        native_root: impl Into<PathBuf>,
        degraded_root: impl Into<PathBuf>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            native_root: native_root.into(),
            degraded_root: degraded_root.into(),
            namespace: namespace.into(),
        }
    }

    pub fn root(&self, degraded: bool) -> &Path {
        if degraded {
            &self.degraded_root
        } else {
            &self.native_root
        }
    }

    /// `<root>/<namespace>`
    pub fn namespace_dir(&self, degraded: bool) -> PathBuf {
        self.root(degraded).join(&self.namespace)
    }

    /// `<root>/<namespace>/<owner>-<name>`, without touching the filesystem
    pub fn path_for(&self, identity: &RepositoryIdentity, degraded: bool) -> PathBuf {
        self.namespace_dir(degraded).join(identity.cache_key())
    }

    /// Compute the cache directory and make sure it exists
    pub async fn resolve(&self, identity: &RepositoryIdentity, degraded: bool) -> BugsmithResult<PathBuf> {
        let namespace_dir = self.namespace_dir(degraded);
        ensure_dir(&namespace_dir).await?;

        let repo_dir = namespace_dir.join(identity.cache_key());
        ensure_dir(&repo_dir).await?;

        debug!("Cache directory for {}: {}", identity, repo_dir.display());
        Ok(repo_dir)
    }
}

async fn ensure_dir(dir: &Path) -> BugsmithResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| BugsmithError::filesystem(format!("creating directory {}", dir.display()), e))
}
