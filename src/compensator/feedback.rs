//! Compensated open and closed loops.

use num_complex::Complex64;

use super::Compensator;
use crate::analysis::{
    find_gain_level, stability_margins_of, Bisection, FrequencyResponse, SearchConfig,
    StabilityMargins,
};
use crate::circuit::Plant;
use crate::error::Result;

/// Closed-loop level that defines the bandwidth (dB).
pub const BANDWIDTH_LEVEL_DB: f64 = -3.0;

/// T/(1+T) for an open-loop phasor T.
///
/// When T is exactly -1 the loop is singular and the result is a NaN phasor
/// instead of a panic or an infinity of arbitrary sign.
pub fn closed_loop_from_open(open_loop: Complex64) -> Complex64 {
    let denominator = Complex64::new(1.0, 0.0) + open_loop;
    if denominator.re == 0.0 && denominator.im == 0.0 {
        return Complex64::new(f64::NAN, f64::NAN);
    }
    open_loop / denominator
}

/// Plant in series with a compensator, unity feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct CompensatedLoop {
    plant: Plant,
    compensator: Compensator,
}

impl CompensatedLoop {
    /// Close a loop around `plant` with `compensator`.
    pub fn new(plant: Plant, compensator: Compensator) -> Self {
        Self { plant, compensator }
    }

    /// The plant.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// The compensator.
    pub fn compensator(&self) -> &Compensator {
        &self.compensator
    }

    /// Open loop T = H·C.
    pub fn open_loop(&self, frequency_hz: f64) -> Complex64 {
        self.plant.transfer_function(frequency_hz)
            * self.compensator.transfer_function(frequency_hz)
    }

    /// Closed loop T/(1+T). NaN phasor when T = -1.
    pub fn closed_loop(&self, frequency_hz: f64) -> Complex64 {
        closed_loop_from_open(self.open_loop(frequency_hz))
    }

    /// View of the closed loop as a [`FrequencyResponse`].
    pub fn as_closed_loop(&self) -> ClosedLoop<'_> {
        ClosedLoop(self)
    }

    /// Crossover and margins of the open loop.
    pub fn margins(&self, config: &SearchConfig) -> Result<StabilityMargins> {
        self.plant.require_complete()?;
        stability_margins_of(self, config)
    }

    /// Frequency where the closed-loop gain falls to -3 dB.
    pub fn closed_loop_bandwidth(&self, config: &SearchConfig) -> Result<Bisection> {
        self.plant.require_complete()?;
        find_gain_level(&self.as_closed_loop(), BANDWIDTH_LEVEL_DB, config)
    }
}

impl FrequencyResponse for CompensatedLoop {
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        self.open_loop(frequency_hz)
    }
}

/// Closed-loop view of a [`CompensatedLoop`].
#[derive(Debug, Clone, Copy)]
pub struct ClosedLoop<'a>(&'a CompensatedLoop);

impl FrequencyResponse for ClosedLoop<'_> {
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        self.0.closed_loop(frequency_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gain_db;
    use approx::assert_relative_eq;

    fn reference_loop() -> CompensatedLoop {
        CompensatedLoop::new(
            Plant::new(1.0, 1e-3, 1e-6),
            Compensator::type1(2.0 * std::f64::consts::PI * 1_000.0),
        )
    }

    #[test]
    fn test_open_loop_is_product() {
        let l = reference_loop();
        let f = 2_000.0;
        let expected = l.plant().transfer_function(f) * l.compensator().transfer_function(f);
        assert_eq!(l.open_loop(f), expected);
        assert_eq!(l.evaluate(f), expected);
    }

    #[test]
    fn test_closed_loop_formula() {
        let l = reference_loop();
        let f = 700.0;
        let t = l.open_loop(f);
        let cl = l.closed_loop(f);
        let expected = t / (1.0 + t);
        assert_relative_eq!(cl.re, expected.re, max_relative = 1e-12);
        assert_relative_eq!(cl.im, expected.im, max_relative = 1e-12);
    }

    #[test]
    fn test_singular_closed_loop_is_nan() {
        let cl = closed_loop_from_open(Complex64::new(-1.0, 0.0));
        assert!(cl.re.is_nan() && cl.im.is_nan());
    }

    #[test]
    fn test_closed_loop_tracks_at_low_frequency() {
        // Integral action: T → ∞ as f → 0, so T/(1+T) → 1
        let l = reference_loop();
        let cl = l.closed_loop(0.01);
        assert!(gain_db(cl).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_plant_rejected() {
        let l = CompensatedLoop::new(
            Plant {
                capacitance: None,
                ..Plant::new(1.0, 1e-3, 1e-6)
            },
            Compensator::type2(1.0, 10.0),
        );
        assert!(l.margins(&SearchConfig::default()).is_err());
        assert!(l.closed_loop_bandwidth(&SearchConfig::default()).is_err());
        assert_eq!(l.open_loop(1_000.0), Complex64::new(0.0, 0.0));
    }
}
