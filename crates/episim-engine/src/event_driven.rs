//! # episim-engine::event_driven
//!
//! The next-reaction engines. Every potential transition is scheduled as an
//! event in a time-ordered queue; competing exponentials guarantee that the
//! earliest surviving event per node has the correct distribution, so the
//! drain loop reproduces the continuous-time Markov chain exactly while doing
//! work proportional to the number of events.

use crate::events::{EventKind, EventQueue, Queued};
use crate::graph::ContactGraph;
use crate::output::{SirHistory, SirResult, SisHistory, SisResult};
use crate::params::{resolve_initial, EpidemicParams};
use crate::rates::RateFns;
use crate::rng;
use crate::state::{StatusMap, TimeMap};
use episim_types::errors::EpiError;
use episim_types::status::Status;
use episim_types::time::{SimTime, SIM_EPOCH};
use episim_types::trajectory::{SirTrajectory, SisTrajectory};
use rand::Rng;

/// Waiting-time sampling for a next-reaction SIR run.
///
/// This is the extension seam for non-Markovian dynamics: the engine asks for
/// an infectious period once per infection and for a candidate transmission
/// delay once per (source, neighbor) pair, and keeps only candidates that
/// beat both the source's recovery and the target's current prediction.
/// Returning `+∞` from either method means "never".
pub trait SirDelays<G: ContactGraph> {
    /// Infectious period of a freshly infected node, measured from infection.
    fn recovery_delay<R: Rng>(&mut self, graph: &G, node: G::NodeId, rng: &mut R) -> SimTime;

    /// Delay from the infection of `source` until it would transmit to
    /// `target`, assuming `source` stayed infectious that long.
    fn transmission_delay<R: Rng>(
        &mut self,
        graph: &G,
        source: G::NodeId,
        target: G::NodeId,
        rng: &mut R,
    ) -> SimTime;
}

/// Markovian (exponential) waiting times from base rates plus optional
/// per-edge transmission and per-node recovery weights.
pub struct MarkovianSir<'g, G: ContactGraph> {
    rates: RateFns<'g, G>,
}

impl<'g, G: ContactGraph> MarkovianSir<'g, G> {
    pub fn new(rates: RateFns<'g, G>) -> Self {
        Self { rates }
    }
}

impl<'g, G: ContactGraph> SirDelays<G> for MarkovianSir<'g, G> {
    fn recovery_delay<R: Rng>(&mut self, _graph: &G, node: G::NodeId, rng: &mut R) -> SimTime {
        rng::exponential(rng, self.rates.rec_rate(node))
    }

    fn transmission_delay<R: Rng>(
        &mut self,
        _graph: &G,
        source: G::NodeId,
        target: G::NodeId,
        rng: &mut R,
    ) -> SimTime {
        rng::exponential(rng, self.rates.trans_rate(source, target))
    }
}

/// Mutable state of one SIR run. Handlers take `&mut self` instead of
/// closing over shared lists, so every mutation site is explicit.
struct SirRun<'g, G: ContactGraph, D> {
    graph: &'g G,
    delays: D,
    status: StatusMap<G::NodeId>,
    rec_time: TimeMap<G::NodeId>,
    pred_inf_time: TimeMap<G::NodeId>,
    queue: EventQueue<G::NodeId>,
    trajectory: SirTrajectory,
    history: Option<SirHistory<G::NodeId>>,
}

impl<'g, G, D> SirRun<'g, G, D>
where
    G: ContactGraph,
    D: SirDelays<G>,
{
    /// Handles a transmission event landing on `target`. Stale events (the
    /// target is no longer susceptible) are no-ops.
    fn process_trans<R: Rng>(&mut self, time: SimTime, target: G::NodeId, rng: &mut R) {
        if !self.status.get(target).is_susceptible() {
            return;
        }
        self.status.set(target, Status::Infected);
        self.trajectory.record_infection(time);
        tracing::trace!(target: "events", time, node = ?target, "infected");

        let rec_time = time + self.delays.recovery_delay(self.graph, target, rng);
        self.rec_time.set(target, rec_time);
        self.queue.add(rec_time, EventKind::Recover { node: target });
        if let Some(history) = &mut self.history {
            history.infection_time.insert(target, time);
            history.recovery_time.insert(target, rec_time);
        }

        for v in self.graph.neighbors(target) {
            self.find_trans(time, target, v, rng);
        }
    }

    /// Decides whether a transmission from `source` to `target` will occur,
    /// and if so schedules it and updates the target's prediction.
    fn find_trans<R: Rng>(
        &mut self,
        time: SimTime,
        source: G::NodeId,
        target: G::NodeId,
        rng: &mut R,
    ) {
        if !self.status.get(target).is_susceptible() {
            return;
        }
        let inf_time = time + self.delays.transmission_delay(self.graph, source, target, rng);
        // Keep the candidate only if the source is still infectious then and
        // no earlier transmission into the target is already scheduled.
        if inf_time < self.rec_time.get(source).min(self.pred_inf_time.get(target)) {
            self.queue.add(
                inf_time,
                EventKind::Transmit {
                    source: Some(source),
                    target,
                },
            );
            self.pred_inf_time.set(target, inf_time);
        }
    }

    fn process_rec(&mut self, time: SimTime, node: G::NodeId) {
        self.trajectory.record_recovery(time);
        self.status.set(node, Status::Recovered);
        tracing::trace!(target: "events", time, node = ?node, "recovered");
    }
}

/// Event-driven SIR with caller-supplied waiting-time sampling.
///
/// `fast_sir` layers the Markovian case on top of this. Initial infections
/// are realized as ordinary transmission events at t = 0 and the bootstrap
/// trajectory entries are trimmed afterwards, which is sound because every
/// sampled delay is strictly positive and the bootstrap events were enqueued
/// first.
pub fn fast_non_markov_sir<G, D, R>(
    graph: &G,
    delays: D,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<SirResult<G::NodeId>, EpiError>
where
    G: ContactGraph,
    D: SirDelays<G>,
    R: Rng,
{
    let initial = resolve_initial(graph, params, rng)?;
    tracing::debug!(
        nodes = graph.order(),
        seeds = initial.len(),
        tmax = params.tmax,
        "starting event-driven SIR"
    );

    let mut run = SirRun {
        graph,
        delays,
        status: StatusMap::new(),
        rec_time: TimeMap::with_default(f64::NEG_INFINITY),
        pred_inf_time: TimeMap::with_default(f64::INFINITY),
        queue: EventQueue::new(params.tmax),
        trajectory: SirTrajectory::new(graph.order(), 0, 0),
        history: params.return_full_data.then(SirHistory::default),
    };

    for &u in &initial {
        run.pred_inf_time.set(u, SIM_EPOCH);
        run.queue.add(
            SIM_EPOCH,
            EventKind::Transmit {
                source: None,
                target: u,
            },
        );
    }
    let bootstrapped = run.queue.len();

    while let Some(Queued { time, kind, .. }) = run.queue.pop() {
        match kind {
            EventKind::Transmit { target, .. } => run.process_trans(time, target, rng),
            EventKind::Recover { node } => run.process_rec(time, node),
        }
    }

    run.trajectory.trim_start(bootstrapped);
    Ok(SirResult {
        trajectory: run.trajectory,
        history: run.history,
    })
}

/// Event-driven SIR with Markovian (exponential) infection and recovery
/// times, optionally scaled by per-edge and per-node weights.
pub fn fast_sir<G, R>(
    graph: &G,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<SirResult<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    let rates = RateFns::new(
        graph,
        params.tau,
        params.gamma,
        params.transmission_weight,
        params.recovery_weight,
    );
    fast_non_markov_sir(graph, MarkovianSir::new(rates), params, rng)
}

/// Mutable state of one SIS run.
struct SisRun<'g, G: ContactGraph> {
    graph: &'g G,
    rates: RateFns<'g, G>,
    status: StatusMap<G::NodeId>,
    rec_time: TimeMap<G::NodeId>,
    queue: EventQueue<G::NodeId>,
    trajectory: SisTrajectory,
    history: Option<SisHistory<G::NodeId>>,
}

impl<'g, G: ContactGraph> SisRun<'g, G> {
    /// Handles a transmission event from `source` (None for the bootstrap)
    /// landing on `target`.
    fn process_trans<R: Rng>(
        &mut self,
        time: SimTime,
        source: Option<G::NodeId>,
        target: G::NodeId,
        rng: &mut R,
    ) {
        if self.status.get(target).is_susceptible() {
            self.status.set(target, Status::Infected);
            self.trajectory.record_infection(time);
            tracing::trace!(target: "events", time, node = ?target, "infected");

            let rec_time = time + rng::exponential(rng, self.rates.rec_rate(target));
            self.rec_time.set(target, rec_time);
            self.queue.add(rec_time, EventKind::Recover { node: target });
            for v in self.graph.neighbors(target) {
                self.find_next_trans(time, target, v, rng);
            }
            if let Some(history) = &mut self.history {
                history.infection_times.entry(target).or_default().push(time);
            }
        }
        // Whether or not the transmission landed, the source keeps trying to
        // reach this neighbor for the rest of its infectious interval.
        if let Some(source) = source {
            self.find_next_trans(time, source, target, rng);
        }
    }

    /// Schedules the source's next transmission attempt towards `target`
    /// within the source's current infectious interval, if one fits.
    fn find_next_trans<R: Rng>(
        &mut self,
        time: SimTime,
        source: G::NodeId,
        target: G::NodeId,
        rng: &mut R,
    ) {
        assert!(
            self.status.get(source).is_infected(),
            "scheduling a transmission from a non-infectious source"
        );
        let source_rec = self.rec_time.get(source);
        let target_rec = self.rec_time.get(target);
        // The target is susceptible now, or becomes susceptible again before
        // the source recovers; otherwise no attempt can land.
        if target_rec < source_rec {
            let delay = rng::exponential(rng, self.rates.trans_rate(source, target));
            let trans_time = time.max(target_rec) + delay;
            if trans_time < source_rec {
                self.queue.add(
                    trans_time,
                    EventKind::Transmit {
                        source: Some(source),
                        target,
                    },
                );
            }
        }
    }

    fn process_rec(&mut self, time: SimTime, node: G::NodeId) {
        self.trajectory.record_recovery(time);
        self.status.set(node, Status::Susceptible);
        tracing::trace!(target: "events", time, node = ?node, "recovered");
        if let Some(history) = &mut self.history {
            history.recovery_times.entry(node).or_default().push(time);
        }
    }
}

/// Event-driven SIS with Markovian (exponential) infection and recovery
/// times. SIS processes can run forever, so callers should set a finite
/// `tmax`.
pub fn fast_sis<G, R>(
    graph: &G,
    params: &EpidemicParams<'_, G::NodeId>,
    rng: &mut R,
) -> Result<SisResult<G::NodeId>, EpiError>
where
    G: ContactGraph,
    R: Rng,
{
    let initial = resolve_initial(graph, params, rng)?;
    tracing::debug!(
        nodes = graph.order(),
        seeds = initial.len(),
        tmax = params.tmax,
        "starting event-driven SIS"
    );

    let mut run = SisRun {
        graph,
        rates: RateFns::new(
            graph,
            params.tau,
            params.gamma,
            params.transmission_weight,
            params.recovery_weight,
        ),
        status: StatusMap::new(),
        rec_time: TimeMap::with_default(f64::NEG_INFINITY),
        queue: EventQueue::new(params.tmax),
        trajectory: SisTrajectory::new(graph.order(), 0),
        history: params.return_full_data.then(SisHistory::default),
    };

    for &u in &initial {
        run.queue.add(
            SIM_EPOCH,
            EventKind::Transmit {
                source: None,
                target: u,
            },
        );
    }
    let bootstrapped = run.queue.len();

    while let Some(Queued { time, kind, .. }) = run.queue.pop() {
        match kind {
            EventKind::Transmit { source, target } => run.process_trans(time, source, target, rng),
            EventKind::Recover { node } => run.process_rec(time, node),
        }
    }

    run.trajectory.trim_start(bootstrapped);
    Ok(SisResult {
        trajectory: run.trajectory,
        history: run.history,
    })
}
