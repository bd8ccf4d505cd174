//! # episim-engine::params
//!
//! The parameter object shared by the stochastic engines, and the resolution
//! of initial conditions into a concrete set of index cases.

use crate::graph::ContactGraph;
use episim_types::errors::EpiError;
use episim_types::time::{SimTime, NO_HORIZON};
use fxhash::FxHashSet;
use rand::seq::SliceRandom;
use rand::Rng;

/// Rates, seeding, horizon, and output options for one run.
///
/// Exactly one of `initial_infecteds` and `rho` may be given; supplying both
/// is a configuration error. With neither, a single node is chosen uniformly
/// at random. `rho` seeds a deterministic `round(N * rho)` distinct uniform
/// nodes.
#[derive(Debug, Clone)]
pub struct EpidemicParams<'a, N> {
    /// Per-edge transmission rate τ.
    pub tau: f64,
    /// Per-node recovery rate γ.
    pub gamma: f64,
    pub initial_infecteds: Option<Vec<N>>,
    pub rho: Option<f64>,
    /// Hard horizon; events at or beyond it never run. SIR runs may leave it
    /// unbounded, SIS runs should not.
    pub tmax: SimTime,
    /// Edge attribute scaling τ. Ignored by the Gillespie engines, which
    /// require unweighted graphs.
    pub transmission_weight: Option<&'a str>,
    /// Node attribute scaling γ. Ignored by the Gillespie engines.
    pub recovery_weight: Option<&'a str>,
    /// Record per-node infection/recovery timestamps alongside the counts.
    pub return_full_data: bool,
}

impl<'a, N> EpidemicParams<'a, N> {
    pub fn new(tau: f64, gamma: f64) -> Self {
        Self {
            tau,
            gamma,
            initial_infecteds: None,
            rho: None,
            tmax: NO_HORIZON,
            transmission_weight: None,
            recovery_weight: None,
            return_full_data: false,
        }
    }

    /// Seeds the run with an explicit set of index cases.
    pub fn initial_infecteds(mut self, nodes: Vec<N>) -> Self {
        self.initial_infecteds = Some(nodes);
        self
    }

    /// Seeds the run with a uniformly chosen fraction of the population.
    pub fn rho(mut self, rho: f64) -> Self {
        self.rho = Some(rho);
        self
    }

    pub fn tmax(mut self, tmax: SimTime) -> Self {
        self.tmax = tmax;
        self
    }

    pub fn full_data(mut self) -> Self {
        self.return_full_data = true;
        self
    }
}

/// Turns the seeding options into a concrete list of distinct index cases.
/// Raised errors precede any state mutation in the engines.
pub(crate) fn resolve_initial<G, R>(
    graph: &G,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<Vec<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    match (&params.initial_infecteds, params.rho) {
        (Some(_), Some(_)) => Err(EpiError::ConflictingSeeds),
        (Some(nodes), None) => {
            let mut seen = FxHashSet::default();
            let mut initial = Vec::with_capacity(nodes.len());
            for &u in nodes {
                if !graph.has_node(u) {
                    return Err(EpiError::UnknownNode(format!("{u:?}")));
                }
                if seen.insert(u) {
                    initial.push(u);
                }
            }
            Ok(initial)
        }
        (None, rho) => {
            let count = match rho {
                None => 1,
                Some(rho) => (graph.order() as f64 * rho).round() as usize,
            };
            let nodes = graph.nodes();
            Ok(nodes.choose_multiple(rng, count).copied().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::from_topology;
    use crate::rng::seeded;
    use episim_types::topology::TopologySpec;
    use petgraph::graph::NodeIndex;

    #[test]
    fn both_seeding_options_is_an_error() {
        let mut rng = seeded(Some(1));
        let g = from_topology(&TopologySpec::Ring, 6, &mut rng);
        let params = EpidemicParams::new(1.0, 1.0)
            .initial_infecteds(vec![NodeIndex::new(0)])
            .rho(0.5);
        assert_eq!(resolve_initial(&g, &params, &mut rng), Err(EpiError::ConflictingSeeds));
    }

    #[test]
    fn default_is_one_random_node_and_rho_rounds() {
        let mut rng = seeded(Some(2));
        let g = from_topology(&TopologySpec::Ring, 10, &mut rng);
        let one = resolve_initial(&g, &EpidemicParams::new(1.0, 1.0), &mut rng).unwrap();
        assert_eq!(one.len(), 1);

        let params: EpidemicParams<NodeIndex> = EpidemicParams::new(1.0, 1.0).rho(0.25);
        let quarter = resolve_initial(&g, &params, &mut rng).unwrap();
        assert_eq!(quarter.len(), 3); // round(10 * 0.25)
        let distinct: std::collections::HashSet<_> = quarter.iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn explicit_list_is_deduplicated_and_checked() {
        let mut rng = seeded(Some(3));
        let g = from_topology(&TopologySpec::Path, 4, &mut rng);
        let a = NodeIndex::new(1);
        let params = EpidemicParams::new(1.0, 1.0).initial_infecteds(vec![a, a]);
        assert_eq!(resolve_initial(&g, &params, &mut rng).unwrap(), vec![a]);

        let ghost = NodeIndex::new(99);
        let params = EpidemicParams::new(1.0, 1.0).initial_infecteds(vec![ghost]);
        assert!(matches!(
            resolve_initial(&g, &params, &mut rng),
            Err(EpiError::UnknownNode(_))
        ));
    }
}
