//! # episim-types::time
//!
//! Defines the representation of time within a simulation run.
//! Epidemic waiting times are exponentially distributed reals, so simulation
//! time is continuous. A run starts at `SIM_EPOCH` and advances strictly
//! monotonically to at most the caller-supplied horizon `tmax`.

/// The fundamental unit of time in the simulation.
///
/// `+∞` is a legal value and means "never": an unreachable event time, or an
/// unbounded horizon for SIR runs that are guaranteed to terminate.
pub type SimTime = f64;

/// The start of simulation time.
pub const SIM_EPOCH: SimTime = 0.0;

/// An unbounded simulation horizon.
pub const NO_HORIZON: SimTime = f64::INFINITY;
