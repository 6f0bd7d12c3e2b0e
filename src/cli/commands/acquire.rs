//! Acquire command - clone or update a repository into the cache

use crate::acquire::{AcquireOutcome, AcquiredSummary, Acquirer};
use crate::cancel::cancel_pair;
use crate::cli::args::{AcquireArgs, OutputFormat};
use crate::config::Config;
use crate::error::BugsmithResult;
use crate::ui::{TaskSpinner, UiContext};
use tracing::debug;

/// Execute the acquire command
pub async fn execute(args: AcquireArgs, config: &Config) -> BugsmithResult<()> {
    let ctx = UiContext::detect();
    let acquirer = Acquirer::new(config.clone());

    let (handle, token) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling acquisition");
            handle.cancel();
        }
    });

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Acquiring {}...", args.repo));

    let result = acquirer.acquire(&args.repo, &token).await;
    interrupt.abort();

    let acquired = match result {
        Ok(acquired) => acquired,
        Err(e) => {
            spinner.stop_error(&format!("Could not acquire {}", args.repo));
            return Err(e);
        }
    };

    match acquired.outcome {
        AcquireOutcome::Placeholder => {
            spinner.stop_warn(&format!("{} recorded as a placeholder (degraded host)", acquired.identity))
        }
        AcquireOutcome::Updated => spinner.stop(&format!("Updated {}", acquired.identity)),
        AcquireOutcome::Cloned => spinner.stop(&format!("Cloned {}", acquired.identity)),
    }

    match args.format {
        OutputFormat::Text => println!("{}", acquired.path.display()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&AcquiredSummary::from(&acquired))?)
        }
    }

    Ok(())
}
