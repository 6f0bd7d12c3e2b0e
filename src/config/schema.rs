//! Configuration schema for Bugsmith
//!
//! Configuration is stored at `~/.config/bugsmith/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Hard ceiling for the version-query probe
pub const MAX_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Version-control executable settings
    pub git: GitConfig,

    /// Cache directory settings
    pub cache: CacheConfig,

    /// Environment variables consulted by the classifier
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        match self.general.log_format.as_str() {
            "text" | "json" => {}
            other => return Err(format!("general.log_format must be 'text' or 'json', got '{other}'")),
        }

        let git = &self.git;
        if git.binary.as_os_str().is_empty() {
            return Err("git.binary must not be empty".to_string());
        }
        if git.host.is_empty() || git.host.contains('/') {
            return Err(format!("git.host must be a bare host name, got '{}'", git.host));
        }
        if git.probe_timeout_ms == 0 || git.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
            return Err(format!(
                "git.probe_timeout_ms must be between 1 and {MAX_PROBE_TIMEOUT_MS}"
            ));
        }
        if git.update_timeout_secs == 0 || git.clone_timeout_secs == 0 {
            return Err("git timeouts must be greater than zero".to_string());
        }
        if git.probe_max_output_bytes == 0
            || git.update_max_output_bytes == 0
            || git.clone_max_output_bytes == 0
        {
            return Err("git output buffers must be greater than zero".to_string());
        }

        if !is_single_component(&self.cache.namespace) {
            return Err(format!(
                "cache.namespace must be a single directory name, got '{}'",
                self.cache.namespace
            ));
        }

        let env = &self.environment;
        for (key, value) in [
            ("environment.serverless_var", &env.serverless_var),
            ("environment.function_name_var", &env.function_name_var),
            ("environment.platform_env_var", &env.platform_env_var),
        ] {
            if value.is_empty() {
                return Err(format!("{key} must not be empty"));
            }
        }

        Ok(())
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Version-control executable settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Executable name or path
    pub binary: PathBuf,

    /// Host serving the remotes
    pub host: String,

    /// Version-query probe timeout in milliseconds (max 2000)
    pub probe_timeout_ms: u64,

    /// Output cap for the probe
    pub probe_max_output_bytes: usize,

    /// Timeout for updating an existing checkout
    pub update_timeout_secs: u64,

    /// Output cap for updates
    pub update_max_output_bytes: usize,

    /// Timeout for a fresh checkout
    pub clone_timeout_secs: u64,

    /// Output cap for fresh checkouts (progress text can be verbose)
    pub clone_max_output_bytes: usize,
}

impl GitConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.min(MAX_PROBE_TIMEOUT_MS))
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
            host: "github.com".to_string(),
            probe_timeout_ms: MAX_PROBE_TIMEOUT_MS,
            probe_max_output_bytes: 1024,
            update_timeout_secs: 60,
            update_max_output_bytes: 10 * 1024 * 1024,
            clone_timeout_secs: 300,
            clone_max_output_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Cache directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Application namespace directory under the temp root
    pub namespace: String,

    /// Override for the OS-conventional root (ignored in degraded mode)
    pub root: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "bugsmith".to_string(),
            root: None,
        }
    }
}

/// Names of the environment variables that mark a serverless host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Serverless platform flag (checked for truthiness)
    pub serverless_var: String,

    /// Serverless function name (checked for presence)
    pub function_name_var: String,

    /// Platform environment tag (checked for presence)
    pub platform_env_var: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            serverless_var: "VERCEL".to_string(),
            function_name_var: "AWS_LAMBDA_FUNCTION_NAME".to_string(),
            platform_env_var: "VERCEL_ENV".to_string(),
        }
    }
}
