//! # episim-engine::gillespie
//!
//! Direct-method Gillespie engines for unweighted graphs. Because every edge
//! transmits at the same rate τ, susceptible nodes can be stratified by their
//! number of infected neighbors; the total transmission rate is then
//! τ · Σ k · |stratum_k| and the firing node is found by one weighted stratum
//! pick plus one uniform member pick, with no rejection step.
//!
//! Edge and node weights in `EpidemicParams` are ignored here (documented
//! behavior, not an error); the event-driven engines handle weighted graphs.

use crate::graph::ContactGraph;
use crate::indexed::IndexedSet;
use crate::output::{SirHistory, SirResult, SisHistory, SisResult};
use crate::params::{resolve_initial, EpidemicParams};
use crate::rng;
use crate::state::StatusMap;
use episim_types::errors::EpiError;
use episim_types::status::Status;
use episim_types::trajectory::{SirTrajectory, SisTrajectory};
use fxhash::FxHashMap;
use rand::Rng;
use std::hash::Hash;

/// Susceptible nodes partitioned by number of infected neighbors.
///
/// A susceptible node with count k > 0 sits in exactly `groups[k]`; nodes
/// with count 0, and non-susceptible nodes, sit in no group. The engine keeps
/// `Σ k · |groups[k]|` equal to the number of infected-susceptible adjacent
/// pairs in the graph.
struct RiskStrata<N> {
    infected_neighbor_count: FxHashMap<N, usize>,
    groups: Vec<IndexedSet<N>>,
}

impl<N: Copy + Eq + Hash> RiskStrata<N> {
    fn new() -> Self {
        Self {
            infected_neighbor_count: FxHashMap::default(),
            groups: Vec::new(),
        }
    }

    fn count(&self, node: N) -> usize {
        self.infected_neighbor_count.get(&node).copied().unwrap_or(0)
    }

    fn ensure_group(&mut self, k: usize) {
        while self.groups.len() <= k {
            self.groups.push(IndexedSet::new());
        }
    }

    /// Total transmission weight Σ k · |groups[k]|, in units of τ.
    fn total_weight(&self) -> usize {
        self.groups.iter().enumerate().map(|(k, g)| k * g.len()).sum()
    }

    /// A susceptible node gained an infected neighbor.
    fn promote(&mut self, node: N) {
        let count = self.count(node);
        if count > 0 {
            self.groups[count].remove(node);
        }
        let count = count + 1;
        self.infected_neighbor_count.insert(node, count);
        self.ensure_group(count);
        self.groups[count].insert(node);
    }

    /// A susceptible node lost an infected neighbor.
    fn demote(&mut self, node: N) {
        let count = self.count(node);
        self.groups[count].remove(node);
        let count = count - 1;
        self.infected_neighbor_count.insert(node, count);
        if count > 0 {
            self.groups[count].insert(node);
        }
    }

    /// Removes a node from its stratum when it stops being susceptible. Its
    /// stale count entry is harmless and overwritten on re-entry (SIS).
    fn extract(&mut self, node: N) {
        let count = self.count(node);
        if count > 0 {
            self.groups[count].remove(node);
        }
    }

    /// Re-enters a node with a freshly computed count (SIS recovery).
    fn reinsert(&mut self, node: N, count: usize) {
        self.infected_neighbor_count.insert(node, count);
        if count > 0 {
            self.ensure_group(count);
            self.groups[count].insert(node);
        }
    }

    /// Picks the stratum with probability proportional to k · |groups[k]|,
    /// then a uniform member of it. The CDF scan uses strict comparisons;
    /// floating-point slack falls back to the last non-empty stratum.
    fn choose_victim<R: Rng>(&self, rng: &mut R) -> Option<N> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let mut r = rng.gen::<f64>() * total as f64;
        let mut chosen = None;
        for (k, group) in self.groups.iter().enumerate().skip(1) {
            if group.is_empty() {
                continue;
            }
            chosen = Some(k);
            r -= (k * group.len()) as f64;
            if r < 0.0 {
                break;
            }
        }
        self.groups[chosen?].choose(rng)
    }
}

/// Shared initialization: statuses, the infected list, and the strata.
fn initialize<G: ContactGraph>(
    graph: &G,
    initial: &[G::NodeId],
) -> (StatusMap<G::NodeId>, Vec<G::NodeId>, RiskStrata<G::NodeId>) {
    let mut status = StatusMap::new();
    for &u in initial {
        status.set(u, Status::Infected);
    }
    let mut strata = RiskStrata::new();
    for &u in initial {
        for v in graph.neighbors(u) {
            if status.get(v).is_susceptible() {
                strata.promote(v);
            }
        }
    }
    (status, initial.to_vec(), strata)
}

/// Direct-method Gillespie SIR on an unweighted graph.
pub fn gillespie_sir<G, R>(
    graph: &G,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<SirResult<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    let initial = resolve_initial(graph, params, rng)?;
    tracing::debug!(
        nodes = graph.order(),
        seeds = initial.len(),
        tmax = params.tmax,
        "starting Gillespie SIR"
    );
    let (mut status, mut infected, mut strata) = initialize(graph, &initial);
    let mut trajectory = SirTrajectory::new(graph.order() - initial.len(), initial.len(), 0);
    let mut history = params.return_full_data.then(|| {
        let mut h = SirHistory::default();
        for &u in &initial {
            h.infection_time.insert(u, 0.0);
        }
        h
    });

    let mut total_rate = params.tau * strata.total_weight() as f64
        + params.gamma * infected.len() as f64;
    let mut next_time = rng::exponential(rng, total_rate);

    while next_time < params.tmax && !infected.is_empty() {
        let total_rec_rate = params.gamma * infected.len() as f64;
        let r = rng.gen::<f64>() * total_rate;
        if r < total_rec_rate {
            // A recovery fires on a uniformly random infected node.
            assert_eq!(
                infected.len(),
                trajectory.last_counts().1,
                "infected list diverged from the trajectory"
            );
            let index = rng.gen_range(0..infected.len());
            let node = infected.swap_remove(index);
            status.set(node, Status::Recovered);
            trajectory.record_recovery(next_time);
            tracing::trace!(target: "events", time = next_time, node = ?node, "recovered");
            for v in graph.neighbors(node) {
                if status.get(v).is_susceptible() {
                    strata.demote(v);
                }
            }
            if let Some(history) = &mut history {
                history.recovery_time.insert(node, next_time);
            }
        } else {
            // An infection fires on a stratum-weighted susceptible node.
            let recipient = strata
                .choose_victim(rng)
                .expect("transmission fired with empty risk strata");
            assert!(
                status.get(recipient).is_susceptible(),
                "risk strata held a non-susceptible node"
            );
            strata.extract(recipient);
            infected.push(recipient);
            status.set(recipient, Status::Infected);
            trajectory.record_infection(next_time);
            tracing::trace!(target: "events", time = next_time, node = ?recipient, "infected");
            for v in graph.neighbors(recipient) {
                if status.get(v).is_susceptible() {
                    strata.promote(v);
                }
            }
            if let Some(history) = &mut history {
                history.infection_time.insert(recipient, next_time);
            }
        }

        total_rate = params.tau * strata.total_weight() as f64
            + params.gamma * infected.len() as f64;
        next_time += rng::exponential(rng, total_rate);
    }

    Ok(SirResult { trajectory, history })
}

/// Direct-method Gillespie SIS on an unweighted graph without self-loops.
///
/// Self-loops would corrupt the stratum bookkeeping on the infection path, so
/// they are rejected up front; strip them before calling.
pub fn gillespie_sis<G, R>(
    graph: &G,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<SisResult<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    for u in graph.nodes() {
        if graph.neighbors(u).contains(&u) {
            return Err(EpiError::SelfLoops(format!("{u:?}")));
        }
    }
    let initial = resolve_initial(graph, params, rng)?;
    tracing::debug!(
        nodes = graph.order(),
        seeds = initial.len(),
        tmax = params.tmax,
        "starting Gillespie SIS"
    );
    let (mut status, mut infected, mut strata) = initialize(graph, &initial);
    let mut trajectory = SisTrajectory::new(graph.order() - initial.len(), initial.len());
    let mut history = params.return_full_data.then(|| {
        let mut h = SisHistory::default();
        for &u in &initial {
            h.infection_times.entry(u).or_default().push(0.0);
        }
        h
    });

    let mut total_rate = params.tau * strata.total_weight() as f64
        + params.gamma * infected.len() as f64;
    let mut next_time = rng::exponential(rng, total_rate);

    while next_time < params.tmax && !infected.is_empty() {
        let total_rec_rate = params.gamma * infected.len() as f64;
        let r = rng.gen::<f64>() * total_rate;
        if r < total_rec_rate {
            // A recovery fires; the node returns to the susceptible pool.
            assert_eq!(
                infected.len(),
                trajectory.last_counts().1,
                "infected list diverged from the trajectory"
            );
            let index = rng.gen_range(0..infected.len());
            let node = infected.swap_remove(index);
            status.set(node, Status::Susceptible);
            trajectory.record_recovery(next_time);
            tracing::trace!(target: "events", time = next_time, node = ?node, "recovered");
            // The node re-enters the strata with its own infected-neighbor
            // count; its susceptible neighbors each lose one.
            let mut own_count = 0;
            for v in graph.neighbors(node) {
                match status.get(v) {
                    Status::Infected => own_count += 1,
                    Status::Susceptible => {
                        if v != node {
                            strata.demote(v);
                        }
                    }
                    Status::Recovered => unreachable!("no recovered compartment in SIS"),
                }
            }
            strata.reinsert(node, own_count);
            if let Some(history) = &mut history {
                history.recovery_times.entry(node).or_default().push(next_time);
            }
        } else {
            let recipient = strata
                .choose_victim(rng)
                .expect("transmission fired with empty risk strata");
            assert!(
                status.get(recipient).is_susceptible(),
                "risk strata held a non-susceptible node"
            );
            strata.extract(recipient);
            infected.push(recipient);
            status.set(recipient, Status::Infected);
            trajectory.record_infection(next_time);
            tracing::trace!(target: "events", time = next_time, node = ?recipient, "infected");
            for v in graph.neighbors(recipient) {
                if status.get(v).is_susceptible() {
                    strata.promote(v);
                }
            }
            if let Some(history) = &mut history {
                history.infection_times.entry(recipient).or_default().push(next_time);
            }
        }

        total_rate = params.tau * strata.total_weight() as f64
            + params.gamma * infected.len() as f64;
        next_time += rng::exponential(rng, total_rate);
    }

    Ok(SisResult { trajectory, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_driven::fast_sir;
    use crate::graph::from_topology;
    use crate::rng::seeded;
    use episim_types::topology::TopologySpec;
    use petgraph::graph::{NodeIndex, UnGraph};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    /// Brute-force count of infected-susceptible adjacent pairs.
    fn is_pairs(g: &UnGraph<(), ()>, status: &StatusMap<NodeIndex>) -> usize {
        let mut pairs = 0;
        for u in ContactGraph::nodes(g) {
            if status.get(u).is_infected() {
                for v in ContactGraph::neighbors(g, u) {
                    if status.get(v).is_susceptible() {
                        pairs += 1;
                    }
                }
            }
        }
        pairs
    }

    #[test]
    fn strata_match_the_pair_count_after_initialization() {
        let mut rng = seeded(Some(8));
        let g = from_topology(&TopologySpec::ErdosRenyi { p: 0.4 }, 30, &mut rng);
        let initial: Vec<NodeIndex> = (0..7).map(n).collect();
        let (status, _, strata) = initialize(&g, &initial);
        assert_eq!(strata.total_weight(), is_pairs(&g, &status));
        // Every stratum member holds exactly that many infected neighbors.
        for (k, group) in strata.groups.iter().enumerate().skip(1) {
            for u in ContactGraph::nodes(&g) {
                if group.contains(u) {
                    let infected_neighbors = ContactGraph::neighbors(&g, u)
                        .into_iter()
                        .filter(|&v| status.get(v).is_infected())
                        .count();
                    assert_eq!(infected_neighbors, k);
                    assert!(status.get(u).is_susceptible());
                }
            }
        }
    }

    #[test]
    fn sir_run_holds_conservation_and_terminates_clean() {
        let mut rng = seeded(Some(13));
        let g = from_topology(&TopologySpec::FullMesh, 15, &mut rng);
        let params = EpidemicParams::new(1.0, 1.0).initial_infecteds(vec![n(0)]);
        let result = gillespie_sir(&g, &params, &mut rng).unwrap();
        let tr = &result.trajectory;
        for k in 0..tr.len() {
            assert_eq!(tr.susceptible[k] + tr.infected[k] + tr.recovered[k], 15);
            if k > 0 {
                assert!(tr.times[k] > tr.times[k - 1]);
                assert!(tr.susceptible[k] <= tr.susceptible[k - 1]);
                assert!(tr.recovered[k] >= tr.recovered[k - 1]);
            }
        }
        assert_eq!(*tr.infected.last().unwrap(), 0);
    }

    #[test]
    fn zero_transmission_only_recovers_the_seeds() {
        let mut rng = seeded(Some(29));
        let g = from_topology(&TopologySpec::Ring, 10, &mut rng);
        let params = EpidemicParams::new(0.0, 1.0).rho(0.2);
        let result = gillespie_sir(&g, &params, &mut rng).unwrap();
        assert_eq!(result.final_recovered(), 2);
        assert_eq!(*result.trajectory.susceptible.last().unwrap(), 8);
    }

    #[test]
    fn full_data_records_every_transition() {
        let mut rng = seeded(Some(37));
        let g = from_topology(&TopologySpec::FullMesh, 10, &mut rng);
        let params = EpidemicParams::new(2.0, 1.0).initial_infecteds(vec![n(0)]).full_data();
        let result = gillespie_sir(&g, &params, &mut rng).unwrap();
        let history = result.history.as_ref().unwrap();
        assert_eq!(history.infection_time.len(), result.final_recovered());
        assert_eq!(history.recovery_time.len(), result.final_recovered());
        assert_eq!(history.infection_time[&n(0)], 0.0);
    }

    #[test]
    fn sis_rejects_self_loops() {
        let mut g: UnGraph<(), ()> = UnGraph::new_undirected();
        let a = g.add_node(());
        let b = g.add_node(());
        g.add_edge(a, b, ());
        g.add_edge(a, a, ());
        let params = EpidemicParams::new(1.0, 1.0).initial_infecteds(vec![b]).tmax(5.0);
        assert!(matches!(
            gillespie_sis(&g, &params, &mut seeded(Some(1))),
            Err(EpiError::SelfLoops(_))
        ));
    }

    #[test]
    fn sis_without_recovery_saturates_and_stops() {
        let mut rng = seeded(Some(43));
        let g = from_topology(&TopologySpec::Path, 4, &mut rng);
        let params = EpidemicParams::new(1.0, 0.0).initial_infecteds(vec![n(0)]).tmax(1e6);
        let result = gillespie_sis(&g, &params, &mut rng).unwrap();
        // With no recovery the infection sweeps the component and the total
        // rate drops to zero, ending the run before the horizon.
        assert_eq!(result.final_infected(), 4);
        for k in 0..result.trajectory.len() {
            assert!(result.trajectory.infected[k] >= 1);
            assert_eq!(
                result.trajectory.susceptible[k] + result.trajectory.infected[k],
                4
            );
        }
    }

    #[test]
    fn sis_run_stays_conservative_under_churn() {
        let mut rng = seeded(Some(47));
        let g = from_topology(&TopologySpec::FullMesh, 8, &mut rng);
        let params = EpidemicParams::new(2.0, 1.0).initial_infecteds(vec![n(0)]).tmax(30.0);
        let result = gillespie_sis(&g, &params, &mut rng).unwrap();
        for k in 0..result.trajectory.len() {
            assert_eq!(
                result.trajectory.susceptible[k] + result.trajectory.infected[k],
                8
            );
            assert!(result.trajectory.times[k] < 30.0);
        }
    }

    #[test]
    fn engines_agree_on_the_mean_outbreak_size() {
        // Same graph and rates through both engines; the mean final size over
        // many seeded runs must match closely (both chains have the same law).
        let g = from_topology(&TopologySpec::FullMesh, 8, &mut seeded(Some(6)));
        let params = EpidemicParams::new(5.0, 1.0).initial_infecteds(vec![n(0)]);
        let runs = 300;
        let mut fast_total = 0usize;
        let mut direct_total = 0usize;
        for seed in 0..runs {
            fast_total += fast_sir(&g, &params, &mut seeded(Some(seed)))
                .unwrap()
                .final_recovered();
            direct_total += gillespie_sir(&g, &params, &mut seeded(Some(1000 + seed)))
                .unwrap()
                .final_recovered();
        }
        let fast_mean = fast_total as f64 / runs as f64;
        let direct_mean = direct_total as f64 / runs as f64;
        assert!(fast_mean > 6.0, "fast_sir mean {fast_mean} too small");
        assert!(direct_mean > 6.0, "gillespie mean {direct_mean} too small");
        assert!(
            (fast_mean - direct_mean).abs() < 0.8,
            "engine means diverged: {fast_mean} vs {direct_mean}"
        );
    }
}
