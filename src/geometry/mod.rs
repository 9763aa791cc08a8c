//! CDet readout-channel geometry tables
//!
//! Computes x/y/z positions for every pixel of the coordinate detector and
//! prints them as the `earm.cdet.{x,y,z}pos` database tables. Pixels listed
//! in the unused-pixel CSV are replaced by a sentinel, and on the x axis the
//! remaining pixels of that layer side close up the gap.
//!
//! Iteration order is layer → side → module → bar, one table row per bar
//! holding its 16 paddles.

pub mod pixels;

pub use pixels::{PixelId, UnusedPixels};

use std::io::Write;

use serde::Deserialize;
use thiserror::Error;

pub mod constants {
    pub const NUM_PADDLES: usize = 16;
    pub const NUM_BARS: usize = 14;
    pub const NUM_SIDES: usize = 2;
    pub const NUM_LAYERS: usize = 2;
    pub const NUM_MODULES: usize = 3;

    /// Rows per table: one per bar
    pub const NUM_ROWS: usize = NUM_LAYERS * NUM_SIDES * NUM_MODULES * NUM_BARS;

    /// Paddles per side used for the x-axis centring (2 paddles per bar unused)
    pub const PADDLES_PER_SIDE: usize = NUM_BARS * (NUM_PADDLES - 2) * NUM_MODULES;

    /// Value written for an unused pixel in the x table
    pub const UNUSED_X: f64 = 999.0;
    /// Value written for an unused pixel in the y and z tables
    pub const UNUSED_YZ: f64 = -999.0;
    /// Value of the row closing each table
    pub const TRAILER: f64 = 999.0;
}

use constants::*;

/// Geometry errors
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Failed to read unused pixel list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

/// Detector dimensions in metres
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub paddle_length_m: f64,
    /// Full bar stack thickness (14 bars)
    pub bar_thickness_m: f64,
    /// Mirror plus the gap on either side
    pub mirror_thickness_m: f64,
    /// Horizontal offset of bar subgroups relative to the module centre
    pub subgroup_offset_m: f64,
    pub ecal_z_m: f64,
    pub layer1_offset_m: f64,
    pub layer2_offset_m: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            paddle_length_m: 0.51,
            bar_thickness_m: 0.073,
            mirror_thickness_m: 0.007,
            subgroup_offset_m: 0.075,
            ecal_z_m: 6.00,
            layer1_offset_m: 0.25,
            layer2_offset_m: 0.15,
        }
    }
}

impl Dimensions {
    /// Spacing between neighbouring paddles along x
    pub fn x_pitch(&self) -> f64 {
        self.bar_thickness_m / NUM_BARS as f64
    }

    pub fn x_offset(&self) -> f64 {
        -1.0 * self.x_pitch() * PADDLES_PER_SIDE as f64 / 2.0
    }

    pub fn y_left(&self) -> f64 {
        self.paddle_length_m / 2.0 + self.mirror_thickness_m / 2.0
    }

    pub fn y_right(&self) -> f64 {
        -self.y_left()
    }

    pub fn layer_z(&self, layer: usize) -> f64 {
        if layer == 0 {
            self.ecal_z_m - self.layer1_offset_m
        } else {
            self.ecal_z_m - self.layer2_offset_m
        }
    }
}

/// A readout channel, all indices 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub layer: usize,
    pub side: usize,
    pub module: usize,
    pub bar: usize,
    pub paddle: usize,
}

impl Channel {
    /// Address of this channel on the cabling sheet
    ///
    /// Sides and bars are numbered in reverse; paddles are mirrored on side 1.
    pub fn pixel_id(&self) -> PixelId {
        let paddle = if self.side == 0 {
            self.paddle + 1
        } else {
            NUM_PADDLES - self.paddle
        };
        PixelId::new(
            (self.layer * NUM_MODULES + self.module + 1) as u32,
            (NUM_SIDES - self.side) as u32,
            (NUM_BARS - self.bar) as u32,
            paddle as u32,
        )
    }
}

/// Coordinate axis of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Database key of the table
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "earm.cdet.xpos",
            Axis::Y => "earm.cdet.ypos",
            Axis::Z => "earm.cdet.zpos",
        }
    }
}

/// One position table (one row per bar)
#[derive(Debug, Clone)]
pub struct PositionTable {
    pub axis: Axis,
    pub rows: Vec<[f64; NUM_PADDLES]>,
}

impl PositionTable {
    /// Row index of a bar in iteration order
    pub fn row_index(layer: usize, side: usize, module: usize, bar: usize) -> usize {
        ((layer * NUM_SIDES + side) * NUM_MODULES + module) * NUM_BARS + bar
    }

    pub fn row(
        &self,
        layer: usize,
        side: usize,
        module: usize,
        bar: usize,
    ) -> &[f64; NUM_PADDLES] {
        &self.rows[Self::row_index(layer, side, module, bar)]
    }

    /// Write the table in database format
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{} = ", self.axis.label())?;
        for row in &self.rows {
            write_row(w, row)?;
        }
        write_row(w, &[TRAILER; NUM_PADDLES])
    }
}

fn write_row<W: Write>(w: &mut W, values: &[f64]) -> std::io::Result<()> {
    for value in values {
        write!(w, "{:.3} ", value)?;
    }
    writeln!(w)
}

/// Visit every bar in iteration order; the closure fills the bar's row
fn build_rows<F>(mut fill: F) -> Vec<[f64; NUM_PADDLES]>
where
    F: FnMut(usize, usize, usize, usize, &mut [f64; NUM_PADDLES]),
{
    let mut rows = Vec::with_capacity(NUM_ROWS);
    for layer in 0..NUM_LAYERS {
        for side in 0..NUM_SIDES {
            for module in 0..NUM_MODULES {
                for bar in 0..NUM_BARS {
                    let mut row = [0.0; NUM_PADDLES];
                    fill(layer, side, module, bar, &mut row);
                    rows.push(row);
                }
            }
        }
    }
    rows
}

/// Geometry generator for one detector configuration
#[derive(Debug, Clone)]
pub struct CdetGeometry<'a> {
    dimensions: Dimensions,
    unused: &'a UnusedPixels,
}

impl<'a> CdetGeometry<'a> {
    pub fn new(dimensions: Dimensions, unused: &'a UnusedPixels) -> Self {
        Self { dimensions, unused }
    }

    fn pixel_id(layer: usize, side: usize, module: usize, bar: usize, paddle: usize) -> PixelId {
        Channel {
            layer,
            side,
            module,
            bar,
            paddle,
        }
        .pixel_id()
    }

    fn unused_count(
        &self,
        layer: usize,
        side: usize,
        module: usize,
        bar: usize,
        paddle: usize,
    ) -> u32 {
        self.unused.count(&Self::pixel_id(layer, side, module, bar, paddle))
    }

    fn is_unused(
        &self,
        layer: usize,
        side: usize,
        module: usize,
        bar: usize,
        paddle: usize,
    ) -> bool {
        self.unused.contains(&Self::pixel_id(layer, side, module, bar, paddle))
    }

    /// x positions; unused pixels shift the rest of their layer side
    pub fn xpos(&self) -> PositionTable {
        let pitch = self.dimensions.x_pitch();
        let offset = self.dimensions.x_offset();
        let mut missing = 0u32;

        let rows = build_rows(|layer, side, module, bar, row| {
            if module == 0 && bar == 0 {
                // New layer side
                missing = 0;
            }
            for (paddle, value) in row.iter_mut().enumerate() {
                let unused = self.unused_count(layer, side, module, bar, paddle);
                if unused > 0 {
                    missing += unused;
                    *value = UNUSED_X;
                } else {
                    let paddle_number = (bar + NUM_BARS * module) * NUM_PADDLES + paddle;
                    let x = offset + pitch * paddle_number as f64 - pitch * missing as f64;
                    *value = -x;
                }
            }
        });
        PositionTable { axis: Axis::X, rows }
    }

    /// y positions; bar subgroups are staggered per module
    pub fn ypos(&self) -> PositionTable {
        let dims = &self.dimensions;
        let shift = dims.subgroup_offset_m;

        let rows = build_rows(|layer, side, module, bar, row| {
            let base = if side == 0 { dims.y_left() } else { dims.y_right() };
            let lower_half = 2 * bar <= NUM_BARS;
            let y = match module {
                0 if lower_half => base - shift,
                0 => base,
                1 => base + shift,
                _ if lower_half => base,
                _ => base - shift,
            };
            for (paddle, value) in row.iter_mut().enumerate() {
                *value = if self.is_unused(layer, side, module, bar, paddle) {
                    UNUSED_YZ
                } else {
                    y
                };
            }
        });
        PositionTable { axis: Axis::Y, rows }
    }

    /// z positions; one plane per layer
    pub fn zpos(&self) -> PositionTable {
        let rows = build_rows(|layer, side, module, bar, row| {
            let z = self.dimensions.layer_z(layer);
            for (paddle, value) in row.iter_mut().enumerate() {
                *value = if self.is_unused(layer, side, module, bar, paddle) {
                    UNUSED_YZ
                } else {
                    z
                };
            }
        });
        PositionTable { axis: Axis::Z, rows }
    }

    /// All three tables in output order
    pub fn tables(&self) -> [PositionTable; 3] {
        [self.xpos(), self.ypos(), self.zpos()]
    }

    /// Write x, y and z tables separated by blank lines
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for (i, table) in self.tables().iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            table.write_to(w)?;
        }
        Ok(())
    }
}
