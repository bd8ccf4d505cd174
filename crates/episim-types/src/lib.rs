//! # episim-types
//!
//! This crate provides the foundational, shared data types used across the
//! entire EpiSim workspace. Its purpose is to break dependency cycles by
//! providing a stable, central location for types that `episim-engine` and
//! `episim-cli` need to agree upon.

#![forbid(unsafe_code)]

pub mod errors;
pub mod scenario;
pub mod status;
pub mod time;
pub mod topology;
pub mod trajectory;
