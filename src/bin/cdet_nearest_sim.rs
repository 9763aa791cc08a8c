//! cdet-nearest-sim - random CDet hits matched by nearest x between layers
//!
//! Usage:
//!   cdet-nearest-sim                               # settings from config (or defaults)
//!   cdet-nearest-sim -n 1000 --layer1-hits 500 --layer2-hits 250 --seed 42
//!   cdet-nearest-sim --seed 42 -o nearest.json     # also write the histograms

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vftdc_rs::common::SimulationArgs;
use vftdc_rs::config::Config;
use vftdc_rs::simulation::NearestHitSimulation;

fn main() -> anyhow::Result<()> {
    // Initialize tracing (logging); stdout carries the summary
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("vftdc_rs=info".parse()?))
        .init();

    let args = SimulationArgs::parse();
    let mut settings = Config::load_or_default(&args.common.config_file)?.simulation;

    if let Some(events) = args.events {
        settings.events = events;
    }
    if let Some(hits) = args.layer1_hits {
        settings.layer1_hits = hits;
    }
    if let Some(hits) = args.layer2_hits {
        settings.layer2_hits = hits;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let mut simulation = NearestHitSimulation::new(settings)?;
    let result = simulation.run();

    if let Some(path) = &args.output {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, &result)?;
        writeln!(out)?;
        out.flush()?;
        info!(output = %path.display(), "Wrote histograms");
    }

    print!("{}", result);
    Ok(())
}
