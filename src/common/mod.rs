//! Common infrastructure shared by the binaries

pub mod cli;
pub use cli::{CommonArgs, DecodeArgs, GeometryArgs, SimulationArgs};
