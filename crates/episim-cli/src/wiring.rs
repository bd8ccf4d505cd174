//! # episim-cli::wiring
//!
//! Contains the logic for turning a scenario file into the pieces a run
//! needs: the parsed scenario, the contact graph, and the RNG seed.

use anyhow::Result;
use episim_engine::graph::from_topology;
use episim_types::scenario::Scenario;
use petgraph::graph::UnGraph;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Parses a scenario file, choosing the format by extension.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)?;
    let scenario: Scenario = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => {
            return Err(anyhow::anyhow!(
                "unsupported scenario file extension (expected .toml, .yaml, or .yml)"
            ))
        }
    };
    Ok(scenario)
}

/// Builds the contact graph a scenario describes. Random topologies draw
/// from the run's master RNG, so the whole run is reproducible from one seed.
pub fn build_graph<R: Rng>(scenario: &Scenario, rng: &mut R) -> UnGraph<(), ()> {
    from_topology(&scenario.topology, scenario.nodes, rng)
}

/// Resolves the run seed: the CLI flag beats the scenario file, and with
/// neither the seed comes from entropy.
pub fn get_seed(opts_seed: Option<u64>, scenario_seed: Option<u64>) -> u64 {
    opts_seed
        .or(scenario_seed)
        .unwrap_or_else(|| rand::thread_rng().gen())
}
