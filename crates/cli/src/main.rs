mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use scifi_athena::{AthenaClient, AthenaConfig};
use scifi_core::{load_dotenv, Config};
use scifi_workflow::{TableDefinitions, Workflow};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let overrides = args.overrides();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile, &overrides),
        None => Config::from_env(&overrides),
    }
    .context("failed to resolve configuration")?;

    match args.command {
        Command::Variables => output::print_variables(&config)?,
        Command::Ddl => {
            let tables = TableDefinitions::render(&config.params)
                .context("failed to render table definitions")?;
            output::print_ddl(&tables);
        }
        Command::Run { json } => {
            config.log_summary();

            let client = AthenaClient::new(AthenaConfig::from_config(&config)).await;
            let workflow = Workflow::new(&config, &client)?;
            let report = workflow.run().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }

            let report = report.into_result().context("provisioning run failed")?;
            info!(run_id = %report.run_id, "done");
        }
    }

    Ok(())
}
