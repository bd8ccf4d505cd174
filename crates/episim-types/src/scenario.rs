//! # episim-types::scenario
//!
//! Defines the Rust structs that map directly to the scenario files
//! (YAML/TOML) consumed by the CLI. This is the authoritative schema for
//! defining simulation experiments.

use crate::time::SimTime;
use crate::topology::{NodeId, TopologySpec};
use serde::{Deserialize, Serialize};

/// The top-level structure for a scenario definition file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of nodes in the generated topology.
    pub nodes: usize,
    pub topology: TopologySpec,
    pub model: ModelSpec,
}

/// Which simulation entry point a scenario exercises.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub enum ModelSpec {
    /// Event-driven (next-reaction) SIR.
    FastSir(EpidemicSpec),
    /// Event-driven (next-reaction) SIS.
    FastSis(EpidemicSpec),
    /// Direct-method Gillespie SIR (unweighted).
    GillespieSir(EpidemicSpec),
    /// Direct-method Gillespie SIS (unweighted, no self-loops).
    GillespieSis(EpidemicSpec),
    /// Undirected bond percolation with fixed transmission probability.
    EstimateSirProbSize { p: f64 },
    /// Directed percolation under Markovian rates.
    EstimateDirectedSirProbSize { tau: f64, gamma: f64 },
}

/// Rate and seeding parameters shared by the stochastic engines.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EpidemicSpec {
    pub tau: f64,
    pub gamma: f64,
    /// Initial fraction infected; mutually exclusive with `initial_infecteds`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_infecteds: Option<Vec<NodeId>>,
    /// Simulation horizon. SIS runs need a finite one; SIR runs default to
    /// unbounded and terminate when the infection dies out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmax: Option<SimTime>,
}

impl Scenario {
    /// Validates the scenario for logical consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes == 0 {
            return Err("scenario must have at least one node".to_string());
        }
        match &self.topology {
            TopologySpec::Star { hub } => {
                if (*hub as usize) >= self.nodes {
                    return Err(format!("star hub {} out of range; max is {}", hub, self.nodes - 1));
                }
            }
            TopologySpec::ErdosRenyi { p } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(format!("Erdos-Renyi p = {p} is not a probability"));
                }
            }
            TopologySpec::FromEdges { edges } => {
                for &(u, v) in edges {
                    if (u as usize) >= self.nodes || (v as usize) >= self.nodes {
                        return Err(format!("edge ({u}, {v}) references a node outside 0..{}", self.nodes));
                    }
                }
            }
            TopologySpec::FullMesh | TopologySpec::Ring | TopologySpec::Path => {}
        }
        match &self.model {
            ModelSpec::FastSir(spec) | ModelSpec::GillespieSir(spec) => spec.validate(self.nodes, false),
            ModelSpec::FastSis(spec) | ModelSpec::GillespieSis(spec) => spec.validate(self.nodes, true),
            ModelSpec::EstimateSirProbSize { p } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(format!("transmission probability p = {p} is not a probability"));
                }
                Ok(())
            }
            ModelSpec::EstimateDirectedSirProbSize { tau, gamma } => {
                if *tau < 0.0 || *gamma < 0.0 {
                    return Err("rates must be non-negative".to_string());
                }
                Ok(())
            }
        }
    }
}

impl EpidemicSpec {
    fn validate(&self, nodes: usize, sis: bool) -> Result<(), String> {
        if self.tau < 0.0 || self.gamma < 0.0 {
            return Err("rates must be non-negative".to_string());
        }
        if self.rho.is_some() && self.initial_infecteds.is_some() {
            return Err("cannot define both initial_infecteds and rho".to_string());
        }
        if let Some(rho) = self.rho {
            if !(0.0..=1.0).contains(&rho) {
                return Err(format!("rho = {rho} is not a fraction"));
            }
        }
        if let Some(initial) = &self.initial_infecteds {
            for &u in initial {
                if (u as usize) >= nodes {
                    return Err(format!("initial infected {u} is outside 0..{nodes}"));
                }
            }
        }
        if sis {
            if let Some(tmax) = self.tmax {
                if !tmax.is_finite() {
                    return Err("SIS runs need a finite tmax".to_string());
                }
            }
        }
        Ok(())
    }
}
