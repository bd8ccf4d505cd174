//! # episim-types::trajectory
//!
//! Time series emitted by the simulation engines. Each state-changing event
//! appends exactly one entry to every column, so the columns always have
//! equal length and consecutive entries differ by a single unit move between
//! two compartments.

use crate::time::{SimTime, SIM_EPOCH};
use serde::{Deserialize, Serialize};

/// The (t, S, I, R) time series of an SIR run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SirTrajectory {
    pub times: Vec<SimTime>,
    pub susceptible: Vec<usize>,
    pub infected: Vec<usize>,
    pub recovered: Vec<usize>,
}

impl SirTrajectory {
    /// Creates a trajectory seeded with an initial sample at t = 0.
    pub fn new(susceptible: usize, infected: usize, recovered: usize) -> Self {
        Self {
            times: vec![SIM_EPOCH],
            susceptible: vec![susceptible],
            infected: vec![infected],
            recovered: vec![recovered],
        }
    }

    /// Appends a raw sample. Used by the discrete-generation engine, where a
    /// single step may move many nodes at once.
    pub fn push(&mut self, time: SimTime, susceptible: usize, infected: usize, recovered: usize) {
        self.times.push(time);
        self.susceptible.push(susceptible);
        self.infected.push(infected);
        self.recovered.push(recovered);
    }

    /// Records an S -> I transition at `time`.
    pub fn record_infection(&mut self, time: SimTime) {
        let (s, i, r) = self.last_counts();
        self.push(time, s - 1, i + 1, r);
    }

    /// Records an I -> R transition at `time`.
    pub fn record_recovery(&mut self, time: SimTime) {
        let (s, i, r) = self.last_counts();
        self.push(time, s, i - 1, r + 1);
    }

    /// The most recent (S, I, R) sample.
    pub fn last_counts(&self) -> (usize, usize, usize) {
        let last = self.times.len() - 1;
        (self.susceptible[last], self.infected[last], self.recovered[last])
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Drops the first `n` entries of every column. The event-driven engine
    /// uses this to discard the bootstrap entries generated by processing
    /// the initial infections at t = 0.
    pub fn trim_start(&mut self, n: usize) {
        self.times.drain(..n);
        self.susceptible.drain(..n);
        self.infected.drain(..n);
        self.recovered.drain(..n);
    }
}

/// The (t, S, I) time series of an SIS run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SisTrajectory {
    pub times: Vec<SimTime>,
    pub susceptible: Vec<usize>,
    pub infected: Vec<usize>,
}

impl SisTrajectory {
    /// Creates a trajectory seeded with an initial sample at t = 0.
    pub fn new(susceptible: usize, infected: usize) -> Self {
        Self {
            times: vec![SIM_EPOCH],
            susceptible: vec![susceptible],
            infected: vec![infected],
        }
    }

    pub fn push(&mut self, time: SimTime, susceptible: usize, infected: usize) {
        self.times.push(time);
        self.susceptible.push(susceptible);
        self.infected.push(infected);
    }

    /// Records an S -> I transition at `time`.
    pub fn record_infection(&mut self, time: SimTime) {
        let (s, i) = self.last_counts();
        self.push(time, s - 1, i + 1);
    }

    /// Records an I -> S transition at `time`.
    pub fn record_recovery(&mut self, time: SimTime) {
        let (s, i) = self.last_counts();
        self.push(time, s + 1, i - 1);
    }

    /// The most recent (S, I) sample.
    pub fn last_counts(&self) -> (usize, usize) {
        let last = self.times.len() - 1;
        (self.susceptible[last], self.infected[last])
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn trim_start(&mut self, n: usize) {
        self.times.drain(..n);
        self.susceptible.drain(..n);
        self.infected.drain(..n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sir_unit_steps_conserve_population() {
        let mut tr = SirTrajectory::new(10, 0, 0);
        tr.record_infection(0.5);
        tr.record_infection(0.7);
        tr.record_recovery(1.2);
        assert_eq!(tr.last_counts(), (8, 1, 1));
        for k in 0..tr.len() {
            assert_eq!(tr.susceptible[k] + tr.infected[k] + tr.recovered[k], 10);
        }
    }

    #[test]
    fn trim_drops_bootstrap_entries() {
        let mut tr = SirTrajectory::new(3, 0, 0);
        tr.record_infection(0.0);
        tr.record_infection(0.0);
        tr.trim_start(2);
        assert_eq!(tr.len(), 1);
        assert_eq!(tr.last_counts(), (1, 2, 0));
    }

    #[test]
    fn sis_recovery_returns_to_susceptible() {
        let mut tr = SisTrajectory::new(4, 1);
        tr.record_infection(0.3);
        tr.record_recovery(0.9);
        assert_eq!(tr.last_counts(), (4, 1));
        assert_eq!(tr.times, vec![0.0, 0.3, 0.9]);
    }
}
