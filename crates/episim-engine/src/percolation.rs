//! # episim-engine::percolation
//!
//! Percolation-based outbreak estimators. A continuous-time SIR question is
//! reduced to reachability on a derived graph: sample each node's infectious
//! duration and each directed pair's transmission delay once, keep the edges
//! whose delay beats the duration, and read epidemic probability and attack
//! rate off the strongly-connected-component structure.

use crate::graph::ContactGraph;
use crate::params::{resolve_initial, EpidemicParams};
use crate::rng;
use episim_types::errors::EpiError;
use episim_types::time::SimTime;
use fxhash::{FxHashMap, FxHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::{Bfs, GraphRef, IntoNeighbors, Reversed, Visitable};
use rand::Rng;

/// Node payload of a directed percolation graph: the source-graph node plus
/// its sampled infectious duration.
#[derive(Debug, Clone, Copy)]
pub struct PercNode<N> {
    pub id: N,
    pub duration: SimTime,
}

/// Edge payload: delay from the infection of the source endpoint until it
/// would transmit. Always strictly less than the source's duration.
#[derive(Debug, Clone, Copy)]
pub struct PercEdge {
    pub delay: SimTime,
}

/// Bond percolation: keeps each undirected edge independently with
/// probability `p`. Node payloads carry the source graph's node ids.
pub fn percolate_network<G, R>(graph: &G, p: f64, rng: &mut R) -> UnGraph<G::NodeId, ()>
where
    G: ContactGraph,
    R: Rng,
{
    let mut h = UnGraph::new_undirected();
    let mut index = FxHashMap::default();
    for u in graph.nodes() {
        index.insert(u, h.add_node(u));
    }
    for u in graph.nodes() {
        let ui = index[&u];
        for v in graph.neighbors(u) {
            let vi = index[&v];
            // Each undirected edge is decided exactly once.
            if ui.index() < vi.index() && rng.gen::<f64>() < p {
                h.add_edge(ui, vi, ());
            }
        }
    }
    h
}

/// Directed percolation for Markovian SIR: node durations ~ Exp(γ), pair
/// delays ~ Exp(τ), and u -> v survives iff u would transmit before
/// recovering.
pub fn directed_percolate_network<G, R>(
    graph: &G,
    tau: f64,
    gamma: f64,
    rng: &mut R,
) -> DiGraph<PercNode<G::NodeId>, PercEdge>
where
    G: ContactGraph,
    R: Rng,
{
    let mut h = DiGraph::new();
    let mut index = FxHashMap::default();
    for u in graph.nodes() {
        let duration = rng::exponential(rng, gamma);
        index.insert(u, h.add_node(PercNode { id: u, duration }));
    }
    for u in graph.nodes() {
        let duration = h[index[&u]].duration;
        for v in graph.neighbors(u) {
            let delay = rng::exponential(rng, tau);
            if delay < duration {
                h.add_edge(index[&u], index[&v], PercEdge { delay });
            }
        }
    }
    h
}

/// The general non-Markovian form: `xi[u]` describes u's infectiousness,
/// `zeta[v]` describes v's susceptibility, and the caller-supplied predicate
/// decides whether u would transmit to v. Both maps must cover every node.
pub fn non_markov_directed_percolate_network<G, X, Z, F>(
    graph: &G,
    xi: &FxHashMap<G::NodeId, X>,
    zeta: &FxHashMap<G::NodeId, Z>,
    mut transmission: F,
) -> DiGraph<G::NodeId, ()>
where
    G: ContactGraph,
    F: FnMut(&X, &Z) -> bool,
{
    let mut h = DiGraph::new();
    let mut index = FxHashMap::default();
    for u in graph.nodes() {
        index.insert(u, h.add_node(u));
    }
    for u in graph.nodes() {
        let infectiousness = xi.get(&u).expect("xi must cover every node");
        for v in graph.neighbors(u) {
            let susceptibility = zeta.get(&v).expect("zeta must cover every node");
            if transmission(infectiousness, susceptibility) {
                h.add_edge(index[&u], index[&v], ());
            }
        }
    }
    h
}

/// Closure of `start` under out-edges, including `start` itself.
fn reachable<G>(graph: G, start: G::NodeId) -> Vec<G::NodeId>
where
    G: GraphRef + IntoNeighbors + Visitable,
{
    let mut bfs = Bfs::new(graph, start);
    let mut seen = Vec::new();
    while let Some(node) = bfs.next(graph) {
        seen.push(node);
    }
    seen
}

/// Epidemic probability and attack rate from an already-percolated directed
/// graph: anchor on the largest strongly connected component, then
/// PE = |in-component| / N and AR = |out-component| / N.
pub fn estimate_prob_size_from_directed_percolation<NW, EW>(h: &DiGraph<NW, EW>) -> (f64, f64) {
    let giant = tarjan_scc(h)
        .into_iter()
        .max_by_key(|component| component.len())
        .unwrap_or_default();
    let Some(&anchor) = giant.first() else {
        return (0.0, 0.0);
    };
    let n = h.node_count() as f64;
    let out_component = reachable(h, anchor).len();
    let in_component = reachable(Reversed(h), anchor).len();
    (in_component as f64 / n, out_component as f64 / n)
}

/// Epidemic probability and size under a fixed transmission probability `p`,
/// by undirected bond percolation. The two returned values are equal; both
/// are given for symmetry with the directed estimator.
pub fn estimate_sir_prob_size<G, R>(graph: &G, p: f64, rng: &mut R) -> (f64, f64)
where
    G: ContactGraph,
    R: Rng,
{
    if graph.order() == 0 {
        return (0.0, 0.0);
    }
    let h = percolate_network(graph, p, rng);
    // On an undirected graph the strongly connected components are exactly
    // the connected components.
    let largest = tarjan_scc(&h)
        .into_iter()
        .map(|component| component.len())
        .max()
        .unwrap_or(0);
    let fraction = largest as f64 / graph.order() as f64;
    (fraction, fraction)
}

/// Epidemic probability and attack rate under Markovian SIR rates.
pub fn estimate_directed_sir_prob_size<G, R>(
    graph: &G,
    tau: f64,
    gamma: f64,
    rng: &mut R,
) -> (f64, f64)
where
    G: ContactGraph,
    R: Rng,
{
    let h = directed_percolate_network(graph, tau, gamma, rng);
    estimate_prob_size_from_directed_percolation(&h)
}

/// Epidemic probability and attack rate under a caller-supplied
/// transmissibility predicate.
pub fn estimate_non_markov_sir_prob_size<G, X, Z, F>(
    graph: &G,
    xi: &FxHashMap<G::NodeId, X>,
    zeta: &FxHashMap<G::NodeId, Z>,
    transmission: F,
) -> (f64, f64)
where
    G: ContactGraph,
    F: FnMut(&X, &Z) -> bool,
{
    let h = non_markov_directed_percolate_network(graph, xi, zeta, transmission);
    estimate_prob_size_from_directed_percolation(&h)
}

/// One sample of the set of eventually infected nodes: percolates the graph,
/// then takes everything reachable from the initial infecteds (defaulting to
/// one uniformly random node).
pub fn get_infected_nodes<G, R>(
    graph: &G,
    tau: f64,
    gamma: f64,
    initial_infecteds: Option<Vec<G::NodeId>>,
    rng: &mut R,
) -> Result<FxHashSet<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    let mut params = EpidemicParams::new(tau, gamma);
    params.initial_infecteds = initial_infecteds;
    let initial = resolve_initial(graph, &params, rng)?;
    let h = directed_percolate_network(graph, tau, gamma, rng);
    let index: FxHashMap<G::NodeId, NodeIndex> =
        h.node_indices().map(|ix| (h[ix].id, ix)).collect();
    let mut infected = FxHashSet::default();
    for u in initial {
        for ix in reachable(&h, index[&u]) {
            infected.insert(h[ix].id);
        }
    }
    Ok(infected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::from_topology;
    use crate::rng::seeded;
    use episim_types::topology::TopologySpec;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn certain_transmission_keeps_the_whole_path() {
        let mut rng = seeded(Some(1));
        let g = from_topology(&TopologySpec::Path, 10, &mut rng);
        assert_eq!(estimate_sir_prob_size(&g, 1.0, &mut rng), (1.0, 1.0));
    }

    #[test]
    fn impossible_transmission_leaves_singletons() {
        let mut rng = seeded(Some(2));
        let g = from_topology(&TopologySpec::Path, 10, &mut rng);
        assert_eq!(estimate_sir_prob_size(&g, 0.0, &mut rng), (0.1, 0.1));
    }

    #[test]
    fn directed_percolation_edge_survival_follows_the_rates() {
        let mut rng = seeded(Some(3));
        let g = from_topology(&TopologySpec::Path, 6, &mut rng);
        // Immortal infectiousness keeps every directed pair.
        let all = directed_percolate_network(&g, 1.0, 0.0, &mut rng);
        assert_eq!(all.edge_count(), 2 * g.edge_count());
        // Zero transmission keeps none.
        let none = directed_percolate_network(&g, 0.0, 1.0, &mut rng);
        assert_eq!(none.edge_count(), 0);
        for e in all.edge_indices() {
            let (src, _) = all.edge_endpoints(e).unwrap();
            assert!(all[e].delay < all[src].duration);
        }
    }

    #[test]
    fn component_estimates_anchor_on_the_giant_scc() {
        // A -> (B <-> C) -> D: PE counts {A, B, C}, AR counts {B, C, D}.
        let mut h: DiGraph<(), ()> = DiGraph::new();
        let a = h.add_node(());
        let b = h.add_node(());
        let c = h.add_node(());
        let d = h.add_node(());
        h.add_edge(a, b, ());
        h.add_edge(b, c, ());
        h.add_edge(c, b, ());
        h.add_edge(c, d, ());
        assert_eq!(estimate_prob_size_from_directed_percolation(&h), (0.75, 0.75));
    }

    #[test]
    fn near_certain_rates_sweep_the_graph() {
        let mut rng = seeded(Some(5));
        let g = from_topology(&TopologySpec::Path, 10, &mut rng);
        let (pe, ar) = estimate_directed_sir_prob_size(&g, 1e9, 1.0, &mut rng);
        assert_eq!((pe, ar), (1.0, 1.0));
    }

    #[test]
    fn infected_set_matches_the_transmissibility_extremes() {
        let mut rng = seeded(Some(7));
        let g = from_topology(&TopologySpec::Path, 8, &mut rng);
        let everyone = get_infected_nodes(&g, 1e9, 1.0, Some(vec![n(0)]), &mut rng).unwrap();
        assert_eq!(everyone.len(), 8);
        let only_seed = get_infected_nodes(&g, 0.0, 1.0, Some(vec![n(3)]), &mut rng).unwrap();
        assert_eq!(only_seed.len(), 1);
        assert!(only_seed.contains(&n(3)));
    }

    #[test]
    fn non_markov_predicate_drives_the_estimate() {
        let mut rng = seeded(Some(9));
        let g = from_topology(&TopologySpec::Ring, 6, &mut rng);
        let xi: FxHashMap<NodeIndex, ()> = ContactGraph::nodes(&g).into_iter().map(|u| (u, ())).collect();
        let zeta = xi.clone();
        assert_eq!(estimate_non_markov_sir_prob_size(&g, &xi, &zeta, |_, _| true), (1.0, 1.0));
        let (pe, ar) = estimate_non_markov_sir_prob_size(&g, &xi, &zeta, |_, _| false);
        assert_eq!((pe, ar), (1.0 / 6.0, 1.0 / 6.0));
    }
}
