//! Placeholder marker written in degraded mode

use crate::error::{BugsmithError, BugsmithResult};
use crate::identity::RepositoryIdentity;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name of the marker inside the cache directory
pub const MARKER_FILE: &str = ".bugsmith-serverless";

/// Records that a repository was not checked out because the host is degraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerlessMarker {
    pub repo: String,
    pub cloned: bool,
    pub serverless: bool,
}

impl ServerlessMarker {
    pub fn new(identity: &RepositoryIdentity) -> Self {
        Self {
            repo: identity.to_string(),
            cloned: false,
            serverless: true,
        }
    }

    /// Write the marker into `dir`, replacing any previous one
    pub async fn write(&self, dir: &Path) -> BugsmithResult<PathBuf> {
        let path = dir.join(MARKER_FILE);
        let body = serde_json::to_string(self)?;
        fs::write(&path, body)
            .await
            .map_err(|e| BugsmithError::filesystem(format!("writing marker {}", path.display()), e))?;
        Ok(path)
    }

    /// Remove the marker when it is the only entry in `dir`
    ///
    /// A directory holding just a placeholder is safe to clone into once
    /// the marker is gone. Anything else in `dir` leaves it untouched.
    pub async fn clear_stale(dir: &Path) -> BugsmithResult<bool> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(BugsmithError::filesystem(
                    format!("listing {}", dir.display()),
                    e,
                ))
            }
        };

        let mut only_marker = false;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BugsmithError::filesystem(format!("listing {}", dir.display()), e))?
        {
            if only_marker || entry.file_name().to_str() != Some(MARKER_FILE) {
                return Ok(false);
            }
            only_marker = true;
        }
        if !only_marker {
            return Ok(false);
        }

        let path = dir.join(MARKER_FILE);
        fs::remove_file(&path)
            .await
            .map_err(|e| BugsmithError::filesystem(format!("removing marker {}", path.display()), e))?;
        Ok(true)
    }

    /// Read the marker from `dir`, if present
    pub async fn read(dir: &Path) -> BugsmithResult<Option<Self>> {
        let path = dir.join(MARKER_FILE);
        match fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BugsmithError::filesystem(
                format!("reading marker {}", path.display()),
                e,
            )),
        }
    }
}
