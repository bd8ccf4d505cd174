//! # episim-engine::events
//!
//! Defines the core `EventKind` enum, the `Queued` wrapper struct, and the
//! `EventQueue` used by the next-reaction engines. The `Queued` struct wraps
//! an event with its scheduled time and an insertion sequence number for
//! deterministic tie-breaking, making it suitable for the `BinaryHeap` used
//! as a priority queue.

use episim_types::time::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The event types the next-reaction engines schedule.
///
/// Events are immutable once enqueued and there is no cancellation primitive:
/// handlers self-guard at pop time by inspecting the current node status, so
/// a transmission whose target is no longer susceptible is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<N> {
    /// An attempted transmission into `target`. `source` is `None` for the
    /// bootstrap events that realize the initial condition at t = 0.
    Transmit { source: Option<N>, target: N },
    /// The scheduled recovery of `node`.
    Recover { node: N },
}

/// A wrapper for an event that includes scheduling information.
/// This is the type stored in the engine's priority queue.
#[derive(Debug, Clone)]
pub struct Queued<N> {
    pub time: SimTime,
    /// A monotonic sequence number to ensure stable ordering for events
    /// scheduled at the exact same time.
    pub seq: u64,
    pub kind: EventKind<N>,
}

// The following implementations are crucial for the `BinaryHeap` to function
// as a min-heap and to maintain deterministic ordering.

impl<N> PartialEq for Queued<N> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<N> Eq for Queued<N> {}

impl<N> PartialOrd for Queued<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for Queued<N> {
    /// Compares events for the priority queue.
    /// `BinaryHeap` is a max-heap, so we reverse the ordering to make it a
    /// min-heap. The primary sort key is `time` (earlier is greater); the
    /// secondary key is `seq`, so simultaneous events pop in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A min-heap of scheduled events with a hard upper time bound.
///
/// Events at or beyond the horizon are silently discarded at `add` time; the
/// main loop therefore terminates once every event before `tmax` has run.
#[derive(Debug)]
pub struct EventQueue<N> {
    heap: BinaryHeap<Queued<N>>,
    tmax: SimTime,
    next_seq: u64,
}

impl<N> EventQueue<N> {
    pub fn new(tmax: SimTime) -> Self {
        Self {
            heap: BinaryHeap::new(),
            tmax,
            next_seq: 0,
        }
    }

    /// Schedules `kind` at `time`; a no-op if `time >= tmax`.
    pub fn add(&mut self, time: SimTime, kind: EventKind<N>) {
        if time >= self.tmax {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { time, seq, kind });
    }

    /// Removes and returns the earliest pending event.
    pub fn pop(&mut self) -> Option<Queued<N>> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
