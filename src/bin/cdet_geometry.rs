//! cdet-geometry - print CDet pixel position tables
//!
//! Usage:
//!   cdet-geometry                                   # CSV from config (or default name)
//!   cdet-geometry unusedPixels_parsed.csv
//!   cdet-geometry unused.csv -o db_earm_cdet.dat

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vftdc_rs::common::GeometryArgs;
use vftdc_rs::config::Config;
use vftdc_rs::geometry::{CdetGeometry, UnusedPixels};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (logging); stdout carries the tables
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("vftdc_rs=info".parse()?))
        .init();

    let args = GeometryArgs::parse();
    let config = Config::load_or_default(&args.common.config_file)?;

    let csv_path = args
        .csv
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.geometry.unused_pixels_csv));
    let unused = UnusedPixels::load(&csv_path)?;
    info!(
        csv = %csv_path.display(),
        unused_pixels = unused.len(),
        "Loaded unused pixel list"
    );

    let geometry = CdetGeometry::new(config.geometry.dimensions.clone(), &unused);

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            geometry.write_to(&mut out)?;
            out.flush()?;
            info!(output = %path.display(), "Wrote geometry tables");
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            geometry.write_to(&mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}
