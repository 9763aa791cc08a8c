//! vftdc-rs: vfTDC word decoding and CDet geometry tables
//!
//! This crate decodes 32-bit words from the vfTDC time-to-digital converter,
//! generates the CDet readout-channel position tables and simulates
//! nearest-hit matching between the two CDet layers.

pub mod common;
pub mod config;
pub mod decoder;
pub mod geometry;
pub mod simulation;
