//! CLI argument parsing for the vfTDC and CDet tools
//!
//! Every binary flattens [`CommonArgs`] into its own argument struct, so the
//! `-f/--config` option behaves the same everywhere.

use std::path::PathBuf;

use clap::Parser;

use crate::decoder::ByteOrder;

/// Common arguments shared across all binaries
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short = 'f', long = "config", default_value = "config.toml")]
    pub config_file: String,
}

/// Arguments for the word decoder
#[derive(Parser, Debug, Clone)]
#[command(name = "vftdc-decode", about = "Decode vfTDC 32-bit data words")]
pub struct DecodeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Words to decode, in hex (e.g. 0x94c531b5)
    #[arg(conflicts_with_all = ["file", "demo"])]
    pub words: Vec<String>,

    /// Decode every word of a binary capture file
    #[arg(long = "file", conflicts_with = "demo")]
    pub file: Option<PathBuf>,

    /// Byte order of the capture file (overrides config)
    #[arg(long = "byte-order", value_enum)]
    pub byte_order: Option<ByteOrder>,

    /// Decode the built-in sample capture
    #[arg(long)]
    pub demo: bool,

    /// Print one JSON object per word
    #[arg(long)]
    pub json: bool,

    /// Print a per-type summary at the end
    #[arg(short, long)]
    pub summary: bool,
}

impl DecodeArgs {
    /// True when hex words, a capture file or the sample capture was given
    ///
    /// A capture file that holds no words still counts as input.
    pub fn has_input(&self) -> bool {
        self.file.is_some() || self.demo || !self.words.is_empty()
    }
}

/// Arguments for the geometry table generator
#[derive(Parser, Debug, Clone)]
#[command(name = "cdet-geometry", about = "Print CDet pixel position tables")]
pub struct GeometryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Unused-pixel CSV (overrides config)
    pub csv: Option<PathBuf>,

    /// Write tables to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Arguments for the nearest-hit simulation
#[derive(Parser, Debug, Clone)]
#[command(name = "cdet-nearest-sim", about = "Simulate nearest-x hit matching between CDet layers")]
pub struct SimulationArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of events (overrides config)
    #[arg(short = 'n', long)]
    pub events: Option<u64>,

    /// Hits per event on layer 1 (overrides config)
    #[arg(long = "layer1-hits")]
    pub layer1_hits: Option<usize>,

    /// Hits per event on layer 2 (overrides config)
    #[arg(long = "layer2-hits")]
    pub layer2_hits: Option<usize>,

    /// RNG seed, 0 draws a fresh one (overrides config)
    #[arg(long, env = "CDET_SIM_SEED")]
    pub seed: Option<u64>,

    /// Write the histograms as JSON to this file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
