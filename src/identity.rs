//! Repository identity parsing

use crate::error::{BugsmithError, BugsmithResult};
use std::fmt;

/// Owner/name pair naming a remote repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    owner: String,
    name: String,
}

impl RepositoryIdentity {
    /// Parse an `<owner>/<name>` identifier
    ///
    /// Exactly one `/` is accepted and both segments must be non-empty.
    pub fn parse(identifier: &str) -> BugsmithResult<Self> {
        let invalid = |reason| BugsmithError::InvalidIdentity {
            input: identifier.to_string(),
            reason,
        };

        let mut segments = identifier.split('/');
        let (owner, name) = match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) => (owner, name),
            _ => return Err(invalid("expected exactly one '/' separator")),
        };

        if owner.is_empty() || name.is_empty() {
            return Err(invalid("owner and name must both be non-empty"));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory name for this repository inside the cache namespace
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
