//! # episim-types::errors
//!
//! Defines the common error types used throughout the EpiSim workspace.
//! Using `thiserror` provides clean, descriptive error handling. Errors are
//! raised before any simulation state is mutated; a run that has started
//! never returns a partial trajectory through an `Err`.

use thiserror::Error;

/// A configuration or precondition error raised by the simulation core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpiError {
    #[error("cannot define both initial_infecteds and rho")]
    ConflictingSeeds,
    #[error("initial infected node {0} is not in the graph")]
    UnknownNode(String),
    #[error("graph has a self-loop at node {0}; Gillespie SIS requires a simple graph")]
    SelfLoops(String),
}

/// An error related to parsing or validating scenario files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Validation error in scenario '{name}': {message}")]
    Validation { name: String, message: String },
}
