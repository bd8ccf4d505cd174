//! # episim-cli::commands::run
//!
//! Implements the `run` subcommand: load and validate the scenario, build
//! the contact graph, dispatch the selected model, and report the outcome.

use crate::args::RunOpts;
use crate::wiring::{build_graph, get_seed, load_scenario};
use anyhow::Result;
use episim_engine::prelude::*;
use episim_engine::rng;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::fs;

/// SIS processes need a finite horizon; scenarios that leave it out get this
/// one.
const DEFAULT_SIS_TMAX: SimTime = 100.0;

/// The run outcome, printed as a summary and optionally written as JSON.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Report {
    Sir {
        engine: &'static str,
        events: usize,
        final_susceptible: usize,
        final_infected: usize,
        final_recovered: usize,
        trajectory: SirTrajectory,
    },
    Sis {
        engine: &'static str,
        events: usize,
        final_susceptible: usize,
        final_infected: usize,
        trajectory: SisTrajectory,
    },
    Estimate {
        estimator: &'static str,
        epidemic_probability: f64,
        attack_rate: f64,
    },
}

impl Report {
    fn from_sir(engine: &'static str, result: &SirResult<NodeIndex>) -> Self {
        let (s, i, r) = result.trajectory.last_counts();
        Report::Sir {
            engine,
            events: result.trajectory.len().saturating_sub(1),
            final_susceptible: s,
            final_infected: i,
            final_recovered: r,
            trajectory: result.trajectory.clone(),
        }
    }

    fn from_sis(engine: &'static str, result: &SisResult<NodeIndex>) -> Self {
        let (s, i) = result.trajectory.last_counts();
        Report::Sis {
            engine,
            events: result.trajectory.len().saturating_sub(1),
            final_susceptible: s,
            final_infected: i,
            trajectory: result.trajectory.clone(),
        }
    }

    fn print(&self) {
        match self {
            Report::Sir {
                engine,
                events,
                final_susceptible,
                final_infected,
                final_recovered,
                ..
            } => {
                println!("Engine: {engine}");
                println!("Events: {events}");
                println!(
                    "Final state: S = {final_susceptible}, I = {final_infected}, R = {final_recovered}"
                );
            }
            Report::Sis {
                engine,
                events,
                final_susceptible,
                final_infected,
                ..
            } => {
                println!("Engine: {engine}");
                println!("Events: {events}");
                println!("Final state: S = {final_susceptible}, I = {final_infected}");
            }
            Report::Estimate {
                estimator,
                epidemic_probability,
                attack_rate,
            } => {
                println!("Estimator: {estimator}");
                println!("Epidemic probability: {epidemic_probability:.4}");
                println!("Attack rate: {attack_rate:.4}");
            }
        }
    }
}

fn to_params(
    spec: &EpidemicSpec,
    tmax_override: Option<SimTime>,
    sis: bool,
) -> EpidemicParams<'static, NodeIndex> {
    let mut params = EpidemicParams::new(spec.tau, spec.gamma);
    params.rho = spec.rho;
    params.initial_infecteds = spec
        .initial_infecteds
        .as_ref()
        .map(|nodes| nodes.iter().map(|&u| NodeIndex::new(u as usize)).collect());
    params.tmax = tmax_override
        .or(spec.tmax)
        .unwrap_or(if sis { DEFAULT_SIS_TMAX } else { NO_HORIZON });
    params
}

pub fn exec(opts: RunOpts) -> Result<()> {
    let scenario = load_scenario(&opts.scenario)?;
    scenario.validate().map_err(|message| {
        anyhow::anyhow!(ConfigError::Validation {
            name: scenario.name.clone(),
            message,
        })
    })?;

    let seed = get_seed(opts.seed, scenario.seed);
    println!(
        "Running scenario '{}' ({} nodes) with seed: {}",
        scenario.name, scenario.nodes, seed
    );

    let mut rng = rng::seeded(Some(seed));
    let graph = build_graph(&scenario, &mut rng);
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "contact graph built"
    );

    let report = match &scenario.model {
        ModelSpec::FastSir(spec) => {
            let params = to_params(spec, opts.tmax, false);
            Report::from_sir("fast_sir", &fast_sir(&graph, &params, &mut rng)?)
        }
        ModelSpec::FastSis(spec) => {
            let params = to_params(spec, opts.tmax, true);
            Report::from_sis("fast_sis", &fast_sis(&graph, &params, &mut rng)?)
        }
        ModelSpec::GillespieSir(spec) => {
            let params = to_params(spec, opts.tmax, false);
            Report::from_sir("gillespie_sir", &gillespie_sir(&graph, &params, &mut rng)?)
        }
        ModelSpec::GillespieSis(spec) => {
            let params = to_params(spec, opts.tmax, true);
            Report::from_sis("gillespie_sis", &gillespie_sis(&graph, &params, &mut rng)?)
        }
        ModelSpec::EstimateSirProbSize { p } => {
            let (pe, ar) = estimate_sir_prob_size(&graph, *p, &mut rng);
            Report::Estimate {
                estimator: "undirected_percolation",
                epidemic_probability: pe,
                attack_rate: ar,
            }
        }
        ModelSpec::EstimateDirectedSirProbSize { tau, gamma } => {
            let (pe, ar) = estimate_directed_sir_prob_size(&graph, *tau, *gamma, &mut rng);
            Report::Estimate {
                estimator: "directed_percolation",
                epidemic_probability: pe,
                attack_rate: ar,
            }
        }
    };

    report.print();

    if let Some(path) = &opts.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
