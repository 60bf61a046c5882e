//! # antnet-cli::commands::validate
//!
//! Implements the `validate` subcommand: parse the scenario, run the
//! schema validation, and resolve the topology without simulating.

use crate::commands::load_scenario;
use anyhow::Result;
use antnet_engine::prelude::*;
use std::path::PathBuf;

pub fn exec(scenario: PathBuf) -> Result<()> {
    let scenario = load_scenario(&scenario)?;
    let name = scenario.name.clone();
    let experiment = Experiment::new(scenario)?;
    println!(
        "Scenario '{}' is valid: {} vertices, {} arcs, {} consumer(s), {} producer(s)",
        name,
        experiment.topology.vertices.len(),
        experiment.topology.arcs.len(),
        experiment.scenario.consumers.len(),
        experiment.scenario.producers.len(),
    );
    Ok(())
}
