//! Plant analyzer: transfer function, sweeps and stability margins.

use num_complex::Complex64;

use super::bisection::{find_crossover_of, find_phase_180_of, Bisection};
use super::phasor::{gain_db, phase_degrees, wrap_degrees};
use super::response::FrequencyResponse;
use super::sweep::{frequency_sweep_of, FrequencyPoint};
use super::{DEFAULT_MAX_ITERATIONS, GAIN_TOLERANCE_DB, PHASE_TOLERANCE_DEG};
use crate::circuit::Plant;
use crate::error::{PowerloopError, Result};
use crate::{DEFAULT_SEARCH_END_HZ, DEFAULT_SEARCH_START_HZ};

/// Configuration for the margin searches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchConfig {
    /// Lower search bound (Hz)
    pub start_hz: f64,
    /// Upper search bound (Hz)
    pub end_hz: f64,
    /// Bisection budget
    pub max_iterations: usize,
    /// Crossover tolerance (dB)
    pub gain_tolerance_db: f64,
    /// Phase search tolerance (degrees)
    pub phase_tolerance_deg: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_hz: DEFAULT_SEARCH_START_HZ,
            end_hz: DEFAULT_SEARCH_END_HZ,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            gain_tolerance_db: GAIN_TOLERANCE_DB,
            phase_tolerance_deg: PHASE_TOLERANCE_DEG,
        }
    }
}

impl SearchConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search bracket.
    ///
    /// The default 1 Hz – 1 MHz suits converters switching in the tens to
    /// hundreds of kHz.
    pub fn with_bounds(mut self, start_hz: f64, end_hz: f64) -> Self {
        self.start_hz = start_hz;
        self.end_hz = end_hz;
        self
    }

    /// Set the bisection iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the crossover tolerance in dB.
    pub fn with_gain_tolerance(mut self, tolerance_db: f64) -> Self {
        self.gain_tolerance_db = tolerance_db;
        self
    }

    /// Set the phase search tolerance in degrees.
    pub fn with_phase_tolerance(mut self, tolerance_deg: f64) -> Self {
        self.phase_tolerance_deg = tolerance_deg;
        self
    }

    /// Check the bracket, budget and tolerances.
    pub fn validate(&self) -> Result<()> {
        if !(self.start_hz.is_finite() && self.start_hz > 0.0) {
            return Err(PowerloopError::invalid_range(format!(
                "search start must be a positive frequency, got {}",
                self.start_hz
            )));
        }
        if !(self.end_hz.is_finite() && self.end_hz > self.start_hz) {
            return Err(PowerloopError::invalid_range(format!(
                "search end must be above the start ({} Hz), got {}",
                self.start_hz, self.end_hz
            )));
        }
        if self.max_iterations == 0 {
            return Err(PowerloopError::invalid_range("iteration budget must be non-zero"));
        }
        if !(self.gain_tolerance_db > 0.0 && self.phase_tolerance_deg > 0.0) {
            return Err(PowerloopError::invalid_range("search tolerances must be positive"));
        }
        Ok(())
    }
}

/// Crossover, phase margin and gain margin of a loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StabilityMargins {
    /// 0 dB crossover search
    pub crossover: Bisection,
    /// -180° phase search
    pub phase_crossover: Bisection,
    /// 180° + phase at the crossover, in (0°, 360°]
    pub phase_margin_deg: f64,
    /// The same margin folded into (-180°, 180°]: a loop lagging past -180°
    /// reads negative here
    pub signed_phase_margin_deg: f64,
    /// -gain at the phase crossover
    pub gain_margin_db: f64,
}

impl StabilityMargins {
    /// 0 dB crossover frequency.
    pub fn crossover_hz(&self) -> f64 {
        self.crossover.frequency_hz
    }

    /// -180° phase frequency.
    pub fn phase_crossover_hz(&self) -> f64 {
        self.phase_crossover.frequency_hz
    }

    /// Whether both searches met their tolerance.
    pub fn converged(&self) -> bool {
        self.crossover.converged && self.phase_crossover.converged
    }

    /// Positive signed phase margin and positive gain margin.
    pub fn is_stable(&self) -> bool {
        self.signed_phase_margin_deg > 0.0 && self.gain_margin_db > 0.0
    }

    /// Fail with [`PowerloopError::NonConvergence`] unless both searches
    /// converged.
    pub fn require_converged(self) -> Result<Self> {
        self.crossover.require_converged()?;
        self.phase_crossover.require_converged()?;
        Ok(self)
    }
}

/// Phase margin of `response` at `crossover_hz`: 180° + ∠H.
///
/// With ∠H in (-180°, 180°] the result lies in (0°, 360°]. A loop that has
/// lagged past -180° shows up just below 360°; see
/// [`StabilityMargins::signed_phase_margin_deg`] for the folded reading.
pub fn phase_margin_of<R>(response: &R, crossover_hz: f64) -> f64
where
    R: FrequencyResponse + ?Sized,
{
    180.0 + phase_degrees(response.evaluate(crossover_hz))
}

/// Run both margin searches against any response.
pub fn stability_margins_of<R>(response: &R, config: &SearchConfig) -> Result<StabilityMargins>
where
    R: FrequencyResponse + ?Sized,
{
    let crossover = find_crossover_of(response, config)?;
    let phase_crossover = find_phase_180_of(response, config)?;

    let phase_margin_deg = phase_margin_of(response, crossover.frequency_hz);
    Ok(StabilityMargins {
        crossover,
        phase_crossover,
        phase_margin_deg,
        signed_phase_margin_deg: wrap_degrees(phase_margin_deg),
        gain_margin_db: -gain_db(response.evaluate(phase_crossover.frequency_hz)),
    })
}

/// Analyzer for the bare R-L-C plant.
///
/// Every query is a pure function of the plant and the configuration.
#[derive(Debug, Clone)]
pub struct PlantAnalyzer {
    plant: Plant,
    config: SearchConfig,
}

impl PlantAnalyzer {
    /// Create an analyzer with the default search configuration.
    pub fn new(plant: Plant) -> Self {
        Self {
            plant,
            config: SearchConfig::default(),
        }
    }

    /// Create an analyzer with a custom search configuration.
    pub fn with_config(plant: Plant, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { plant, config })
    }

    /// The analysed plant.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// The search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// H(jω) of the plant. Zero phasor for a degenerate plant.
    pub fn transfer_function(&self, frequency_hz: f64) -> Complex64 {
        self.plant.transfer_function(frequency_hz)
    }

    /// Logarithmic Bode sweep of the plant.
    ///
    /// Runs on degenerate plants too; every point then has `-inf` gain.
    pub fn frequency_sweep(
        &self,
        start_hz: f64,
        end_hz: f64,
        n_points: usize,
    ) -> Result<Vec<FrequencyPoint>> {
        frequency_sweep_of(&self.plant, start_hz, end_hz, n_points)
    }

    /// 0 dB crossover of the plant between `start_hz` and `end_hz`.
    ///
    /// Best effort: see [`Bisection::converged`].
    pub fn find_crossover(&self, start_hz: f64, end_hz: f64) -> Result<Bisection> {
        self.require_analyzable()?;
        find_crossover_of(&self.plant, &self.config.with_bounds(start_hz, end_hz))
    }

    /// -180° phase frequency of the plant between `start_hz` and `end_hz`.
    pub fn find_phase_180(&self, start_hz: f64, end_hz: f64) -> Result<Bisection> {
        self.require_analyzable()?;
        find_phase_180_of(&self.plant, &self.config.with_bounds(start_hz, end_hz))
    }

    /// Phase margin of the plant at `crossover_hz`.
    pub fn phase_margin(&self, crossover_hz: f64) -> Result<f64> {
        self.require_analyzable()?;
        Ok(phase_margin_of(&self.plant, crossover_hz))
    }

    /// Gain margin of the plant over the configured search bounds.
    pub fn gain_margin(&self) -> Result<f64> {
        let phase_crossover = self.find_phase_180(self.config.start_hz, self.config.end_hz)?;
        Ok(-gain_db(self.transfer_function(phase_crossover.frequency_hz)))
    }

    /// Both margins over the configured search bounds.
    pub fn margins(&self) -> Result<StabilityMargins> {
        self.require_analyzable()?;
        stability_margins_of(&self.plant, &self.config)
    }

    fn require_analyzable(&self) -> Result<()> {
        self.plant.require_complete().map(|_| ()).map_err(|e| {
            tracing::warn!(error = %e, "refusing margin search on a degenerate plant");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentKind;
    use approx::assert_relative_eq;

    fn reference_analyzer() -> PlantAnalyzer {
        PlantAnalyzer::new(Plant::new(1.0, 1e-3, 1e-6))
    }

    #[test]
    fn test_default_config_matches_documented_defaults() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.start_hz, 1.0);
        assert_eq!(cfg.end_hz, 1e6);
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.gain_tolerance_db, 0.01);
        assert_eq!(cfg.phase_tolerance_deg, 1.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(SearchConfig::new().with_bounds(0.0, 10.0).validate().is_err());
        assert!(SearchConfig::new().with_bounds(10.0, 10.0).validate().is_err());
        assert!(SearchConfig::new().with_gain_tolerance(0.0).validate().is_err());
        assert!(SearchConfig::new().with_phase_tolerance(-1.0).validate().is_err());
        let plant = Plant::new(1.0, 1e-3, 1e-6);
        let config = SearchConfig::new().with_max_iterations(0);
        assert!(PlantAnalyzer::with_config(plant, config).is_err());
    }

    #[test]
    fn test_sweep_endpoints() {
        let points = reference_analyzer().frequency_sweep(10.0, 1e6, 50).unwrap();
        assert_eq!(points.len(), 50);
        assert_relative_eq!(points[0].frequency_hz, 10.0, max_relative = 1e-12);
        assert_relative_eq!(points[49].frequency_hz, 1e6, max_relative = 1e-9);
        assert!(points.windows(2).all(|w| w[1].frequency_hz > w[0].frequency_hz));
        // Low-pass: DC gain of R = 1 Ω is 0 dB, far above resonance it rolls off
        assert!(points[0].gain_db.abs() < 0.1);
        assert!(points[49].gain_db < -70.0);
    }

    #[test]
    fn test_plant_crossover_is_above_resonance() {
        // With 0 dB DC gain and Q ≈ 31.6 the gain only falls through 0 dB
        // once, just above f₀·√2.
        let analyzer = reference_analyzer();
        let crossover = analyzer.find_crossover(1.0, 1e6).unwrap();
        assert!(crossover.converged);
        assert!(gain_db(analyzer.transfer_function(crossover.frequency_hz)).abs() < 0.01);
        assert!(crossover.frequency_hz > 5_033.0);
        assert!(crossover.frequency_hz < 7_200.0);
    }

    #[test]
    fn test_phase_margin_formula() {
        let analyzer = reference_analyzer();
        let f0 = analyzer.plant().natural_frequency_hz().unwrap();
        // ∠H(f₀) = -90°
        assert_relative_eq!(analyzer.phase_margin(f0).unwrap(), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_margins_phase_margin_is_180_plus_phase() {
        let analyzer = reference_analyzer();
        let margins = analyzer.margins().unwrap();
        let phase = phase_degrees(analyzer.transfer_function(margins.crossover_hz()));
        assert_eq!(margins.phase_margin_deg, 180.0 + phase);
        // Lightly damped: only a few degrees left above resonance
        assert!(margins.phase_margin_deg > 0.0 && margins.phase_margin_deg < 10.0);
        assert_eq!(margins.signed_phase_margin_deg, margins.phase_margin_deg);
    }

    #[test]
    fn test_gain_margin_is_negated_gain_at_phase_crossover() {
        let analyzer = reference_analyzer();
        let phase_crossover = analyzer.find_phase_180(1.0, 1e6).unwrap();
        let expected = -gain_db(analyzer.transfer_function(phase_crossover.frequency_hz));
        assert_eq!(analyzer.gain_margin().unwrap(), expected);
        assert!(expected > 0.0);
    }

    #[test]
    fn test_degenerate_plant_rejects_margin_searches() {
        let analyzer = PlantAnalyzer::new(Plant {
            inductance: None,
            ..Plant::new(1.0, 1e-3, 1e-6)
        });
        assert!(matches!(
            analyzer.find_crossover(1.0, 1e6),
            Err(PowerloopError::MissingPlantElement {
                kind: ComponentKind::Inductor
            })
        ));
        assert!(analyzer.find_phase_180(1.0, 1e6).is_err());
        assert!(matches!(
            analyzer.phase_margin(5_000.0),
            Err(PowerloopError::MissingPlantElement {
                kind: ComponentKind::Inductor
            })
        ));
        assert!(analyzer.gain_margin().is_err());
        assert!(analyzer.margins().is_err());

        // Sweeps still produce every point
        let points = analyzer.frequency_sweep(10.0, 1e3, 5).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.gain_db == f64::NEG_INFINITY));
    }
}
