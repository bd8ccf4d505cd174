//! # episim-engine::output
//!
//! Result bundles returned by the engines: the population-level trajectory
//! plus, when requested, per-node event timestamps. History maps preserve
//! insertion order so repeated runs with the same seed produce identical
//! output byte for byte.

use episim_types::time::SimTime;
use episim_types::trajectory::{SirTrajectory, SisTrajectory};
use indexmap::IndexMap;
use std::hash::Hash;

/// Per-node timestamps from an SIR run. A node infected before the horizon
/// carries its scheduled recovery time even if the run ended first.
#[derive(Debug, Clone)]
pub struct SirHistory<N> {
    pub infection_time: IndexMap<N, SimTime>,
    pub recovery_time: IndexMap<N, SimTime>,
}

impl<N: Eq + Hash> Default for SirHistory<N> {
    fn default() -> Self {
        Self {
            infection_time: IndexMap::new(),
            recovery_time: IndexMap::new(),
        }
    }
}

/// Output of one SIR run.
#[derive(Debug, Clone)]
pub struct SirResult<N> {
    pub trajectory: SirTrajectory,
    pub history: Option<SirHistory<N>>,
}

impl<N> SirResult<N> {
    /// Final number of recovered nodes, the usual outbreak-size statistic.
    pub fn final_recovered(&self) -> usize {
        self.trajectory.recovered.last().copied().unwrap_or(0)
    }
}

/// Per-node episode timestamps from an SIS run; nodes can be infected and
/// recover repeatedly, so the values are sequences.
#[derive(Debug, Clone)]
pub struct SisHistory<N> {
    pub infection_times: IndexMap<N, Vec<SimTime>>,
    pub recovery_times: IndexMap<N, Vec<SimTime>>,
}

impl<N: Eq + Hash> Default for SisHistory<N> {
    fn default() -> Self {
        Self {
            infection_times: IndexMap::new(),
            recovery_times: IndexMap::new(),
        }
    }
}

/// Output of one SIS run.
#[derive(Debug, Clone)]
pub struct SisResult<N> {
    pub trajectory: SisTrajectory,
    pub history: Option<SisHistory<N>>,
}

impl<N> SisResult<N> {
    /// Number of infected nodes when the run ended.
    pub fn final_infected(&self) -> usize {
        self.trajectory.infected.last().copied().unwrap_or(0)
    }
}
