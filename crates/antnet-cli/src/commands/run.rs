//! # antnet-cli::commands::run
//!
//! Implements the `run` subcommand: parse and validate the scenario,
//! apply command-line overrides, run every replicate, and print the
//! aggregated report.

use crate::args::RunOpts;
use crate::commands::load_scenario;
use anyhow::Result;
use antnet_engine::prelude::*;

pub fn exec(opts: RunOpts) -> Result<()> {
    let mut scenario = load_scenario(&opts.scenario)?;
    if let Some(seed) = opts.seed {
        scenario.seed = Some(seed);
    }
    if let Some(stop_at) = opts.stop_at {
        scenario.stop_at = stop_at;
    }
    if let Some(replicates) = opts.replicates {
        scenario.replicates = replicates;
    }

    let experiment = Experiment::new(scenario)?;
    println!(
        "Running scenario '{}': {} replicate(s), seed {}, {:.1} virtual seconds",
        experiment.scenario.name,
        experiment.scenario.replicates,
        experiment.scenario.seed.unwrap_or(2),
        experiment.scenario.stop_at,
    );

    let report = experiment.run()?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ExperimentReport) {
    for run in &report.runs {
        let c = &run.counters;
        println!("run (seed {}):", run.seed);
        println!("  retrieved:        {}", c.retrieved);
        println!("  wasted:           {}", c.wasted);
        println!("  timeout:          {}", c.timeout);
        println!("  interest drops:   {}", c.interest_drop);
        println!("  names served:     {}", c.producer_unique_names_served);
        println!("  interests sent:   {}", c.consumer_sent);
        println!(
            "  link waste:       {} probe / {} content",
            c.ant_waste, c.content_waste
        );
        if let Some(last) = run.monitor.last() {
            println!(
                "  tables at t={:.1}s: {} PAT / {} PIT entries",
                last.at_secs, last.pat_entries, last.pit_entries
            );
        }
    }
    if !report.latency_summary.is_empty() {
        println!("latency per name:");
        for lat in &report.latency_summary {
            println!(
                "  {}: {:.4}s ± {:.4}s ({} sample(s))",
                lat.name, lat.mean_secs, lat.ci95_secs, lat.samples
            );
        }
    }
}
