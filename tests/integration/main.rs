//! Integration tests for Bugsmith

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary with an isolated config file and no serverless markers inherited
    fn bugsmith(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("bugsmith");
        cmd.env("BUGSMITH_CONFIG", config_dir.path().join("config.toml"))
            .env_remove("VERCEL")
            .env_remove("VERCEL_ENV")
            .env_remove("AWS_LAMBDA_FUNCTION_NAME")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("repository acquisition cache"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("bugsmith"));
    }

    #[test]
    fn acquire_rejects_malformed_identifier() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .args(["acquire", "a/b/c"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid repository identifier"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[cfg(unix)]
    #[test]
    fn acquire_on_serverless_host_writes_marker() {
        let dir = TempDir::new().unwrap();
        let output = bugsmith(&dir)
            .env("VERCEL", "1")
            .args(["acquire", "bugsmith-it/serverless-marker", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(summary["repo"], "bugsmith-it/serverless-marker");
        assert_eq!(summary["degraded"], true);

        let path = std::path::PathBuf::from(summary["path"].as_str().unwrap());
        assert_eq!(
            path,
            std::path::Path::new("/tmp/bugsmith/bugsmith-it-serverless-marker")
        );

        let marker: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path.join(".bugsmith-serverless")).unwrap())
                .unwrap();
        assert_eq!(
            marker,
            serde_json::json!({"repo": "bugsmith-it/serverless-marker", "cloned": false, "serverless": true})
        );
    }

    #[test]
    fn env_reports_serverless_flag() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .env("VERCEL", "1")
            .args(["env", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_degraded\": true"))
            .stdout(predicate::str::contains("serverless_flag"));
    }

    #[test]
    fn path_uses_configured_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("cache-root");
        std::fs::write(
            dir.path().join("config.toml"),
            format!("[cache]\nroot = {:?}\n", root.display().to_string()),
        )
        .unwrap();

        bugsmith(&dir)
            .args(["path", "octocat/Hello-World"])
            .assert()
            .success()
            .stdout(predicate::str::contains("octocat-Hello-World"));

        assert!(root.join("bugsmith").join("octocat-Hello-World").is_dir());
    }

    #[test]
    fn rust_log_controls_log_level() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .env("RUST_LOG", "bugsmith=debug")
            .args(["config", "path"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Loaded configuration"));

        bugsmith(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Loaded configuration").not());
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[git]\nprobe_timeout_ms = 0\n").unwrap();

        bugsmith(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[git]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir).args(["config", "init"]).assert().success();
        assert!(dir.path().join("config.toml").is_file());
    }

    #[test]
    fn completions_generate() {
        let dir = TempDir::new().unwrap();
        bugsmith(&dir)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bugsmith"));
    }
}
