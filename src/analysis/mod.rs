//! Frequency-domain analysis engine.
//!
//! The plant is a second-order R-L-C low-pass network evaluated at s = jω:
//!
//! ```text
//!              R
//! H(jω) = -----------------------
//!         (1 - LCω²) + j·RCω
//! ```
//!
//! On top of the transfer function this module provides:
//! - Gain (dB) and phase (degrees) of a phasor
//! - Logarithmic Bode sweeps
//! - Bisection searches for the 0 dB crossover and the -180° phase frequency
//! - Phase and gain margins derived from those two frequencies
//!
//! Sweeps and searches are written against the [`FrequencyResponse`] trait so
//! the compensator designer can reuse them on the compensated loop.

mod analyzer;
mod bisection;
mod phasor;
mod response;
mod sweep;

pub use analyzer::{
    phase_margin_of, stability_margins_of, PlantAnalyzer, SearchConfig, StabilityMargins,
};
pub use bisection::{find_crossover_of, find_gain_level, find_phase_180_of, Bisection};
pub use phasor::{gain_db, phase_degrees, wrap_degrees};
pub use response::{FrequencyResponse, ResponseFn};
pub use sweep::{frequency_sweep_of, log_frequencies, validate_sweep, FrequencyPoint};

/// Bisection iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Crossover search tolerance (dB).
pub const GAIN_TOLERANCE_DB: f64 = 0.01;

/// Phase search tolerance (degrees).
pub const PHASE_TOLERANCE_DEG: f64 = 1.0;
