//! # episim-types::status
//!
//! The closed set of compartments a node can occupy. SIR dynamics use all
//! three; SIS dynamics never produce `Recovered`.

use serde::{Deserialize, Serialize};

/// The epidemiological compartment of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Never infected, or (SIS only) infected and since returned to risk.
    Susceptible,
    /// Currently infectious.
    Infected,
    /// Permanently immune (SIR only).
    Recovered,
}

impl Status {
    pub fn is_susceptible(self) -> bool {
        self == Status::Susceptible
    }

    pub fn is_infected(self) -> bool {
        self == Status::Infected
    }

    pub fn is_recovered(self) -> bool {
        self == Status::Recovered
    }
}
