//! CDet nearest-hit simulation
//!
//! Throws random hits on both CDet layers, pairs every layer-1 hit with the
//! layer-2 hit nearest in x and histograms the pairs:
//!
//! - `xy`: x of the layer-1 hit against x of its layer-2 match
//! - `dx`: x(layer 1) - x(layer 2)
//!
//! Hits land on paddle centres. Each layer spans `-half_span_m..half_span_m`
//! with `paddles_per_side` paddles on each half; paddle 0 sits next to x = 0.

pub mod histogram;

pub use histogram::{Bin, Binning, Histogram1D, Histogram2D};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub mod constants {
    pub const PADDLES_PER_SIDE: u32 = 672;
    pub const HALF_SPAN_M: f64 = 1.68;

    pub const XY_BINS: u32 = 240;
    pub const DX_BINS: u32 = 200;
    /// The dx histogram covers `-DX_RANGE_M..DX_RANGE_M`
    pub const DX_RANGE_M: f64 = 0.25;

    /// Events between progress messages
    pub const PROGRESS_INTERVAL: u64 = 100;
}

use constants::*;

/// Simulation errors
#[derive(Error, Debug, PartialEq)]
pub enum SimulationError {
    #[error("Invalid simulation parameter: {0}")]
    InvalidParameter(String),
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub events: u64,
    /// Hits per event on layer 1
    pub layer1_hits: usize,
    /// Hits per event on layer 2
    pub layer2_hits: usize,
    /// RNG seed, 0 draws a fresh one
    pub seed: u64,
    pub paddles_per_side: u32,
    pub half_span_m: f64,
    pub xy_bins: u32,
    pub dx_bins: u32,
    pub dx_range_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            events: 1000,
            layer1_hits: 500,
            layer2_hits: 250,
            seed: 0,
            paddles_per_side: PADDLES_PER_SIDE,
            half_span_m: HALF_SPAN_M,
            xy_bins: XY_BINS,
            dx_bins: DX_BINS,
            dx_range_m: DX_RANGE_M,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |reason: &str| Err(SimulationError::InvalidParameter(reason.to_string()));

        if self.layer2_hits == 0 {
            return invalid("layer2_hits must be at least 1");
        }
        if self.paddles_per_side == 0 {
            return invalid("paddles_per_side must be at least 1");
        }
        if !(self.half_span_m.is_finite() && self.half_span_m > 0.0) {
            return invalid("half_span_m must be positive");
        }
        if self.xy_bins == 0 || self.dx_bins == 0 {
            return invalid("histograms need at least one bin");
        }
        if !(self.dx_range_m.is_finite() && self.dx_range_m > 0.0) {
            return invalid("dx_range_m must be positive");
        }
        Ok(())
    }

    /// Binning of both axes of the xy histogram
    pub fn xy_binning(&self) -> Binning {
        Binning::new(self.xy_bins, -self.half_span_m, self.half_span_m)
    }

    pub fn dx_binning(&self) -> Binning {
        Binning::new(self.dx_bins, -self.dx_range_m, self.dx_range_m)
    }
}

/// Detector half a hit lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(&self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// x of a paddle centre
pub fn paddle_center_x(side: Side, paddle: u32, half_span_m: f64, paddles_per_side: u32) -> f64 {
    let pitch = half_span_m / paddles_per_side as f64;
    side.sign() * (paddle as f64 + 0.5) * pitch
}

/// Value of `sorted` closest to `x`
///
/// `sorted` must be in ascending order. Ties go to the lower value; `x`
/// outside the range snaps to the nearer end. `None` only for an empty slice.
pub fn nearest_in_sorted(sorted: &[f64], x: f64) -> Option<f64> {
    // First element not less than x
    let idx = sorted.partition_point(|&v| v < x);
    if idx == 0 {
        return sorted.first().copied();
    }
    if idx == sorted.len() {
        return sorted.last().copied();
    }

    let lo = sorted[idx - 1];
    let hi = sorted[idx];
    if (x - lo).abs() <= (hi - x).abs() {
        Some(lo)
    } else {
        Some(hi)
    }
}

/// Histograms filled over one run
#[derive(Debug, Clone, Serialize)]
pub struct NearestHitResult {
    pub seed: u64,
    pub events: u64,
    pub layer1_hits: usize,
    pub layer2_hits: usize,
    /// Layer-1 hits paired with a layer-2 hit
    pub pairs: u64,
    pub xy: Histogram2D,
    pub dx: Histogram1D,
}

impl std::fmt::Display for NearestHitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== CDet Nearest-Hit Simulation ===")?;
        writeln!(f, "  Seed:           {}", self.seed)?;
        writeln!(f, "  Events:         {}", self.events)?;
        writeln!(f, "  Layer 1 hits:   {} per event", self.layer1_hits)?;
        writeln!(f, "  Layer 2 hits:   {} per event", self.layer2_hits)?;
        writeln!(f, "  Pairs filled:   {}", self.pairs)?;
        if let (Some(mean), Some(rms)) = (self.dx.mean(), self.dx.std_dev()) {
            writeln!(f, "  dx mean:        {:.6} m", mean)?;
            writeln!(f, "  dx RMS:         {:.6} m", rms)?;
        }
        writeln!(
            f,
            "  dx in window:   {} (underflow {}, overflow {})",
            self.dx.in_range(),
            self.dx.underflow,
            self.dx.overflow
        )?;
        writeln!(f, "  Same xy bin:    {}", self.xy.diagonal_counts())?;
        Ok(())
    }
}

/// Nearest-hit simulation with its own seeded generator
#[derive(Debug, Clone)]
pub struct NearestHitSimulation {
    config: SimulationConfig,
    rng: StdRng,
    seed: u64,
}

impl NearestHitSimulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let seed = if config.seed == 0 {
            rand::thread_rng().gen()
        } else {
            config.seed
        };
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            config,
        })
    }

    /// Seed actually used, so a run with a drawn seed can be repeated
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// x of one random hit: either side with equal probability, uniform paddle
    pub fn generate_hit(&mut self) -> f64 {
        let side = if self.rng.gen_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let paddle = self.rng.gen_range(0..self.config.paddles_per_side);
        paddle_center_x(
            side,
            paddle,
            self.config.half_span_m,
            self.config.paddles_per_side,
        )
    }

    /// Hits of one event; layer 2 comes back sorted
    pub fn generate_event(&mut self) -> (Vec<f64>, Vec<f64>) {
        let layer1: Vec<f64> = (0..self.config.layer1_hits)
            .map(|_| self.generate_hit())
            .collect();
        let mut layer2: Vec<f64> = (0..self.config.layer2_hits)
            .map(|_| self.generate_hit())
            .collect();
        layer2.sort_by(|a, b| a.total_cmp(b));
        (layer1, layer2)
    }

    pub fn run(&mut self) -> NearestHitResult {
        let xy_binning = self.config.xy_binning();
        let mut xy = Histogram2D::new(xy_binning, xy_binning);
        let mut dx = Histogram1D::new(self.config.dx_binning());
        let mut pairs = 0u64;

        info!(
            seed = self.seed,
            events = self.config.events,
            layer1_hits = self.config.layer1_hits,
            layer2_hits = self.config.layer2_hits,
            "Starting nearest-hit simulation"
        );

        for event in 0..self.config.events {
            let (layer1, layer2) = self.generate_event();
            for &x1 in &layer1 {
                if let Some(x2) = nearest_in_sorted(&layer2, x1) {
                    xy.fill(x1, x2);
                    dx.fill(x1 - x2);
                    pairs += 1;
                }
            }

            if (event + 1) % PROGRESS_INTERVAL == 0 {
                debug!(events = event + 1, pairs, "Simulation progress");
            }
        }

        info!(pairs, "Simulation finished");

        NearestHitResult {
            seed: self.seed,
            events: self.config.events,
            layer1_hits: self.config.layer1_hits,
            layer2_hits: self.config.layer2_hits,
            pairs,
            xy,
            dx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            events: 20,
            layer1_hits: 50,
            layer2_hits: 25,
            seed,
            ..Default::default()
        }
    }

    #[test]
    fn test_nearest_below_minimum() {
        assert_eq!(nearest_in_sorted(&[-1.0, 0.0, 2.0], -5.0), Some(-1.0));
        assert_eq!(nearest_in_sorted(&[-1.0, 0.0, 2.0], -1.0), Some(-1.0));
    }

    #[test]
    fn test_nearest_above_maximum() {
        assert_eq!(nearest_in_sorted(&[-1.0, 0.0, 2.0], 7.0), Some(2.0));
    }

    #[test]
    fn test_nearest_tie_goes_to_lower() {
        assert_eq!(nearest_in_sorted(&[0.0, 2.0], 1.0), Some(0.0));
        assert_eq!(nearest_in_sorted(&[-3.0, -1.0, 1.0], 0.0), Some(-1.0));
    }

    #[test]
    fn test_nearest_between_values() {
        let xs = [-1.0, 0.0, 2.0];
        assert_eq!(nearest_in_sorted(&xs, 0.4), Some(0.0));
        assert_eq!(nearest_in_sorted(&xs, 1.2), Some(2.0));
        assert_eq!(nearest_in_sorted(&xs, 2.0), Some(2.0));
    }

    #[test]
    fn test_nearest_duplicates_and_single() {
        assert_eq!(nearest_in_sorted(&[1.0, 1.0, 1.0], 0.0), Some(1.0));
        assert_eq!(nearest_in_sorted(&[0.5], -10.0), Some(0.5));
        assert_eq!(nearest_in_sorted(&[0.5], 10.0), Some(0.5));
    }

    #[test]
    fn test_nearest_empty() {
        assert_eq!(nearest_in_sorted(&[], 0.0), None);
    }

    #[test]
    fn test_nearest_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut xs: Vec<f64> = (0..rng.gen_range(1..40))
                .map(|_| rng.gen_range(-2.0..2.0))
                .collect();
            xs.sort_by(|a, b| a.total_cmp(b));
            let x: f64 = rng.gen_range(-3.0..3.0);

            let nearest = nearest_in_sorted(&xs, x).unwrap();
            let best = xs
                .iter()
                .map(|v| (x - v).abs())
                .fold(f64::INFINITY, f64::min);
            assert_eq!((x - nearest).abs(), best);
        }
    }

    #[test]
    fn test_paddle_centres() {
        let pitch = HALF_SPAN_M / PADDLES_PER_SIDE as f64;
        let first = paddle_center_x(Side::Right, 0, HALF_SPAN_M, PADDLES_PER_SIDE);
        assert!((first - pitch / 2.0).abs() < 1e-12);

        let last = paddle_center_x(Side::Left, PADDLES_PER_SIDE - 1, HALF_SPAN_M, PADDLES_PER_SIDE);
        assert!((last + HALF_SPAN_M - pitch / 2.0).abs() < 1e-12);
        assert!(last > -HALF_SPAN_M);
    }

    #[test]
    fn test_config_default() {
        let config = SimulationConfig::default();
        assert_eq!(config.events, 1000);
        assert_eq!(config.layer1_hits, 500);
        assert_eq!(config.layer2_hits, 250);
        assert_eq!(config.paddles_per_side, 672);
        assert_eq!(config.xy_binning(), Binning::new(240, -1.68, 1.68));
        assert_eq!(config.dx_binning(), Binning::new(200, -0.25, 0.25));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_config_rejects_empty_layer2() {
        let config = SimulationConfig {
            layer2_hits: 0,
            ..Default::default()
        };
        assert!(matches!(
            NearestHitSimulation::new(config),
            Err(SimulationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_ranges() {
        for config in [
            SimulationConfig {
                half_span_m: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                dx_bins: 0,
                ..Default::default()
            },
            SimulationConfig {
                dx_range_m: f64::NAN,
                ..Default::default()
            },
            SimulationConfig {
                paddles_per_side: 0,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_generated_hits_stay_on_paddle_centres() {
        let mut sim = NearestHitSimulation::new(small_config(11)).unwrap();
        let pitch = HALF_SPAN_M / PADDLES_PER_SIDE as f64;
        for _ in 0..1000 {
            let x = sim.generate_hit();
            assert!(x.abs() < HALF_SPAN_M);
            let slot = x.abs() / pitch - 0.5;
            assert!((slot - slot.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_event_layer2_sorted() {
        let mut sim = NearestHitSimulation::new(small_config(3)).unwrap();
        let (layer1, layer2) = sim.generate_event();
        assert_eq!(layer1.len(), 50);
        assert_eq!(layer2.len(), 25);
        assert!(layer2.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_run_fills_every_pair() {
        let mut sim = NearestHitSimulation::new(small_config(42)).unwrap();
        let result = sim.run();

        assert_eq!(result.seed, 42);
        assert_eq!(result.pairs, 20 * 50);
        assert_eq!(result.xy.total_counts, result.pairs);
        assert_eq!(result.xy.outside, 0);
        assert_eq!(result.xy.bins.iter().sum::<u64>(), result.pairs);
        assert_eq!(result.dx.total_counts, result.pairs);
    }

    #[test]
    fn test_same_seed_same_histograms() {
        let a = NearestHitSimulation::new(small_config(1234)).unwrap().run();
        let b = NearestHitSimulation::new(small_config(1234)).unwrap().run();
        assert_eq!(a.xy.bins, b.xy.bins);
        assert_eq!(a.dx.bins, b.dx.bins);

        let c = NearestHitSimulation::new(small_config(4321)).unwrap().run();
        assert_ne!(a.xy.bins, c.xy.bins);
    }

    #[test]
    fn test_zero_seed_draws_one() {
        let mut sim = NearestHitSimulation::new(small_config(0)).unwrap();
        let mut repeat = NearestHitSimulation::new(small_config(sim.seed())).unwrap();
        assert_eq!(sim.run().xy.bins, repeat.run().xy.bins);
    }

    #[test]
    fn test_summary_display() {
        let result = NearestHitSimulation::new(small_config(5)).unwrap().run();
        let text = result.to_string();
        assert!(text.contains("Pairs filled:   1000"));
        assert!(text.contains("dx RMS:"));
    }
}
