//! Completions command - emit shell completion scripts

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::BugsmithResult;
use clap::CommandFactory;
use std::io;

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> BugsmithResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
