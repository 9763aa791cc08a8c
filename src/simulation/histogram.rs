//! Fixed-binning histograms
//!
//! Lower bin edges are inclusive, upper edges exclusive. Values below the
//! range go to underflow, values at or above the upper edge to overflow.

use serde::{Deserialize, Serialize};

/// Binning of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    /// Number of bins
    pub num_bins: u32,
    /// Lower edge of the first bin
    pub min_value: f64,
    /// Upper edge of the last bin
    pub max_value: f64,
}

/// Where a value lands on an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    Underflow,
    Index(usize),
    Overflow,
}

impl Binning {
    pub fn new(num_bins: u32, min_value: f64, max_value: f64) -> Self {
        Self {
            num_bins,
            min_value,
            max_value,
        }
    }

    pub fn width(&self) -> f64 {
        (self.max_value - self.min_value) / self.num_bins as f64
    }

    pub fn locate(&self, value: f64) -> Bin {
        if value.is_nan() || value < self.min_value {
            return Bin::Underflow;
        }
        if value >= self.max_value {
            return Bin::Overflow;
        }

        let bin = ((value - self.min_value) / self.width()) as usize;
        if bin < self.num_bins as usize {
            Bin::Index(bin)
        } else {
            Bin::Overflow
        }
    }

    /// Centre of bin `index`
    pub fn center(&self, index: usize) -> f64 {
        self.min_value + (index as f64 + 0.5) * self.width()
    }
}

/// 1D histogram with running moments of every filled value
#[derive(Debug, Clone, Serialize)]
pub struct Histogram1D {
    pub binning: Binning,
    pub bins: Vec<u64>,
    pub total_counts: u64,
    pub underflow: u64,
    pub overflow: u64,
    #[serde(skip)]
    sum: f64,
    #[serde(skip)]
    sum_sq: f64,
}

impl Histogram1D {
    pub fn new(binning: Binning) -> Self {
        Self {
            binning,
            bins: vec![0; binning.num_bins as usize],
            total_counts: 0,
            underflow: 0,
            overflow: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.total_counts += 1;
        self.sum += value;
        self.sum_sq += value * value;

        match self.binning.locate(value) {
            Bin::Underflow => self.underflow += 1,
            Bin::Overflow => self.overflow += 1,
            Bin::Index(i) => self.bins[i] += 1,
        }
    }

    /// Entries inside the binned range
    pub fn in_range(&self) -> u64 {
        self.total_counts - self.underflow - self.overflow
    }

    pub fn mean(&self) -> Option<f64> {
        if self.total_counts == 0 {
            return None;
        }
        Some(self.sum / self.total_counts as f64)
    }

    /// Root mean square deviation from the mean
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self.sum_sq / self.total_counts as f64 - mean * mean;
        Some(variance.max(0.0).sqrt())
    }
}

/// 2D histogram, bins stored row by row along x
#[derive(Debug, Clone, Serialize)]
pub struct Histogram2D {
    pub x: Binning,
    pub y: Binning,
    pub bins: Vec<u64>,
    pub total_counts: u64,
    /// Entries outside the range on either axis
    pub outside: u64,
}

impl Histogram2D {
    pub fn new(x: Binning, y: Binning) -> Self {
        Self {
            x,
            y,
            bins: vec![0; x.num_bins as usize * y.num_bins as usize],
            total_counts: 0,
            outside: 0,
        }
    }

    pub fn fill(&mut self, x: f64, y: f64) {
        self.total_counts += 1;
        match (self.x.locate(x), self.y.locate(y)) {
            (Bin::Index(ix), Bin::Index(iy)) => {
                let index = self.index(ix, iy);
                self.bins[index] += 1;
            }
            _ => self.outside += 1,
        }
    }

    fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.x.num_bins as usize + ix
    }

    /// Count in bin (ix, iy), zero outside the grid
    pub fn get(&self, ix: usize, iy: usize) -> u64 {
        if ix >= self.x.num_bins as usize || iy >= self.y.num_bins as usize {
            return 0;
        }
        self.bins[self.index(ix, iy)]
    }

    /// Entries whose x and y fall in the same bin
    pub fn diagonal_counts(&self) -> u64 {
        let n = self.x.num_bins.min(self.y.num_bins) as usize;
        (0..n).map(|i| self.get(i, i)).sum()
    }
}
