//! # episim-engine::prelude
//!
//! A convenience module that re-exports the most commonly used types from the
//! engine and its dependencies. This simplifies imports for other crates in
//! the workspace that depend on the engine.

pub use crate::{
    discrete::{basic_discrete_sir_epidemic, discrete_sir_epidemic, percolation_based_discrete_sir_epidemic},
    event_driven::{fast_non_markov_sir, fast_sir, fast_sis, MarkovianSir, SirDelays},
    events::{EventKind, EventQueue, Queued},
    gillespie::{gillespie_sir, gillespie_sis},
    graph::{from_topology, Attributes, Attrs, ContactGraph},
    indexed::IndexedSet,
    output::{SirHistory, SirResult, SisHistory, SisResult},
    params::EpidemicParams,
    percolation::{
        directed_percolate_network, estimate_directed_sir_prob_size,
        estimate_non_markov_sir_prob_size, estimate_prob_size_from_directed_percolation,
        estimate_sir_prob_size, get_infected_nodes, non_markov_directed_percolate_network,
        percolate_network, PercEdge, PercNode,
    },
    rates::RateFns,
};

pub use episim_types::{
    self, errors::*, scenario::*, status::*, time::*, topology::*, trajectory::*,
};
