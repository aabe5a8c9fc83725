//! Plain-text rendering for the informational subcommands.

use anyhow::Result;
use scifi_core::Config;
use scifi_workflow::TableDefinitions;

/// Resolved configuration as JSON. Secret keys never appear.
pub fn print_variables(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
    Ok(())
}

pub fn print_ddl(tables: &TableDefinitions) {
    for (table, sql) in tables.iter() {
        println!("-- {table}");
        println!("{}\n", sql.trim_end());
    }
}
