//! Env command - show how this host is classified

use crate::acquire::Acquirer;
use crate::cancel::CancelToken;
use crate::cli::args::{EnvArgs, OutputFormat};
use crate::config::Config;
use crate::environment::{EnvironmentProfile, HostOs};
use crate::error::BugsmithResult;
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct EnvReport {
    os: HostOs,
    #[serde(flatten)]
    profile: EnvironmentProfile,
    cache_dir: PathBuf,
}

/// Execute the env command
pub async fn execute(args: EnvArgs, config: &Config) -> BugsmithResult<()> {
    let acquirer = Acquirer::new(config.clone());
    let snapshot = acquirer.snapshot();
    let profile = acquirer.classify(&snapshot, &CancelToken::never()).await;
    let cache_dir = acquirer
        .resolver(&snapshot)
        .namespace_dir(profile.is_degraded);

    let report = EnvReport {
        os: snapshot.os(),
        profile,
        cache_dir,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &EnvReport) {
    let ctx = UiContext::detect();

    ui::section(&ctx, "Environment");
    let os = match report.os {
        HostOs::Windows => "windows",
        HostOs::Other => "unix-like",
    };
    ui::key_value(&ctx, "Host", os);

    let mode = if report.profile.is_degraded {
        "degraded (placeholder only)"
    } else {
        "capable (git checkout)"
    };
    ui::key_value_status(&ctx, "Mode", mode, !report.profile.is_degraded);

    if let Some(reason) = &report.profile.reason {
        ui::key_value(&ctx, "Reason", &reason.to_string());
    }
    ui::key_value(&ctx, "Cache", &report.cache_dir.display().to_string());

    println!(
        "{}",
        if report.profile.is_degraded {
            "degraded"
        } else {
            "capable"
        }
    );
}
