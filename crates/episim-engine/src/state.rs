//! # episim-engine::state
//!
//! Node-keyed state tables with sentinel defaults for unobserved nodes.
//! The engines never materialize entries for nodes the epidemic has not
//! touched, so a run over a million-node graph with a small outbreak stays
//! proportional to the outbreak.

use episim_types::status::Status;
use episim_types::time::SimTime;
use fxhash::FxHashMap;
use std::hash::Hash;

/// Node -> status; an absent key reads as `Susceptible`.
#[derive(Debug, Clone)]
pub struct StatusMap<N> {
    map: FxHashMap<N, Status>,
}

impl<N: Copy + Eq + Hash> StatusMap<N> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    pub fn get(&self, node: N) -> Status {
        self.map.get(&node).copied().unwrap_or(Status::Susceptible)
    }

    pub fn set(&mut self, node: N, status: Status) {
        self.map.insert(node, status);
    }

    /// Number of *observed* nodes currently in `status`. Nodes never touched
    /// by the epidemic are susceptible but not counted here.
    pub fn observed_in(&self, status: Status) -> usize {
        self.map.values().filter(|&&s| s == status).count()
    }
}

impl<N: Copy + Eq + Hash> Default for StatusMap<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Node -> time with a sentinel default for absent keys.
///
/// Recovery times default to `-∞` ("never infected"); predicted infection
/// times default to `+∞` ("no transmission scheduled"). Encoding the sentinel
/// in the map keeps the guard comparisons in the engines branch-free.
#[derive(Debug, Clone)]
pub struct TimeMap<N> {
    map: FxHashMap<N, SimTime>,
    default: SimTime,
}

impl<N: Copy + Eq + Hash> TimeMap<N> {
    pub fn with_default(default: SimTime) -> Self {
        Self {
            map: FxHashMap::default(),
            default,
        }
    }

    pub fn get(&self, node: N) -> SimTime {
        self.map.get(&node).copied().unwrap_or(self.default)
    }

    pub fn set(&mut self, node: N, time: SimTime) {
        self.map.insert(node, time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unobserved_nodes_are_susceptible() {
        let mut status: StatusMap<u32> = StatusMap::new();
        assert_eq!(status.get(7), Status::Susceptible);
        status.set(7, Status::Infected);
        assert_eq!(status.get(7), Status::Infected);
        assert_eq!(status.observed_in(Status::Infected), 1);
        assert_eq!(status.observed_in(Status::Susceptible), 0);
    }

    #[test]
    fn sentinels_apply_to_absent_keys() {
        let mut rec: TimeMap<u32> = TimeMap::with_default(f64::NEG_INFINITY);
        assert_eq!(rec.get(0), f64::NEG_INFINITY);
        rec.set(0, 2.5);
        assert_eq!(rec.get(0), 2.5);

        let pred: TimeMap<u32> = TimeMap::with_default(f64::INFINITY);
        assert_eq!(pred.get(0), f64::INFINITY);
    }
}
