use std::collections::HashMap;

use clap::{Parser, Subcommand};

/// Provision the movielens Athena database and its sci-fi aggregate.
///
/// Parameters come from the environment (optionally prefixed by a profile)
/// and can be overridden one by one with `--var name=value`.
#[derive(Parser, Debug)]
#[command(name = "scifi-dag", version, about)]
pub struct CliArgs {
    /// Connection profile; keys are read as `{PROFILE}_{KEY}` before `{KEY}`
    #[arg(long, env = "SCIFI_PROFILE")]
    pub profile: Option<String>,

    /// Parameter override, e.g. `--var athena_db=movies`. Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the provisioning DAG against Athena
    Run {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved parameters (no secrets)
    Variables,
    /// Print the rendered table DDL
    Ddl,
}

impl CliArgs {
    pub fn overrides(&self) -> HashMap<String, String> {
        self.vars.iter().cloned().collect()
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
