//! # episim-cli::commands::validate
//!
//! Implements the `validate` subcommand.

use crate::wiring::load_scenario;
use anyhow::Result;
use episim_types::errors::ConfigError;
use std::path::Path;

pub fn exec(path: &Path) -> Result<()> {
    let scenario = load_scenario(path)?;
    scenario.validate().map_err(|message| {
        anyhow::anyhow!(ConfigError::Validation {
            name: scenario.name.clone(),
            message,
        })
    })?;
    println!(
        "Scenario '{}' is valid ({} nodes, seed {:?})",
        scenario.name, scenario.nodes, scenario.seed
    );
    Ok(())
}
