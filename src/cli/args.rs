//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Bugsmith - repository acquisition cache
///
/// Fetches a repository into a local cache directory, or records a
/// placeholder when the host cannot run git (e.g. serverless functions).
#[derive(Parser, Debug)]
#[command(name = "bugsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUGSMITH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clone or update a repository into the cache
    Acquire(AcquireArgs),

    /// Show how this host is classified
    Env(EnvArgs),

    /// Print (and create) the cache directory for a repository
    Path(PathArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for machine-readable commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Arguments for the acquire command
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Repository identifier, <owner>/<name>
    pub repo: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the env command
#[derive(Parser, Debug)]
pub struct EnvArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// Repository identifier, <owner>/<name>
    pub repo: String,

    /// Resolve the degraded-mode location instead of the native one
    #[arg(long)]
    pub degraded: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_acquire() {
        let cli = Cli::parse_from(["bugsmith", "acquire", "octocat/Hello-World"]);
        match cli.command {
            Commands::Acquire(args) => {
                assert_eq!(args.repo, "octocat/Hello-World");
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("expected Acquire command"),
        }
    }

    #[test]
    fn cli_parses_acquire_json() {
        let cli = Cli::parse_from(["bugsmith", "acquire", "a/b", "--format", "json"]);
        match cli.command {
            Commands::Acquire(args) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("expected Acquire command"),
        }
    }

    #[test]
    fn cli_parses_path_degraded() {
        let cli = Cli::parse_from(["bugsmith", "path", "a/b", "--degraded"]);
        match cli.command {
            Commands::Path(args) => {
                assert_eq!(args.repo, "a/b");
                assert!(args.degraded);
            }
            _ => panic!("expected Path command"),
        }
    }

    #[test]
    fn cli_parses_config_init_force() {
        let cli = Cli::parse_from(["bugsmith", "config", "init", "--force"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Init { force }),
            }) => assert!(force),
            _ => panic!("expected Config init"),
        }
    }

    #[test]
    fn cli_parses_bare_config() {
        let cli = Cli::parse_from(["bugsmith", "config"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs { action: None })
        ));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["bugsmith", "env"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["bugsmith", "-v", "env"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["bugsmith", "-vv", "env"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_requires_repo_for_acquire() {
        assert!(Cli::try_parse_from(["bugsmith", "acquire"]).is_err());
    }
}
