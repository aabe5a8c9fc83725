//! Integration tests for scifi-workflow: full DAG runs against an in-memory catalog.

mod properties;
mod scenarios;

use std::collections::HashMap;

use scifi_core::{Config, ProvisionParams};

/// Config built from a parameter map, as `--var name=value` would.
pub fn config_from(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_params(ProvisionParams::from_map(&vars).expect("valid params"))
}
