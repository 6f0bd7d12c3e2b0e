//! Path command - print the cache directory for a repository

use crate::acquire::Acquirer;
use crate::cli::args::PathArgs;
use crate::config::Config;
use crate::error::BugsmithResult;
use crate::identity::RepositoryIdentity;

/// Execute the path command
pub async fn execute(args: PathArgs, config: &Config) -> BugsmithResult<()> {
    let identity = RepositoryIdentity::parse(&args.repo)?;

    let acquirer = Acquirer::new(config.clone());
    let resolver = acquirer.resolver(&acquirer.snapshot());
    let path = resolver.resolve(&identity, args.degraded).await?;

    println!("{}", path.display());
    Ok(())
}
