//! Bisection searches for the characteristic loop frequencies.
//!
//! Both searches halve a bracket `[low, high]` at its arithmetic midpoint for
//! a fixed iteration budget. They assume the searched quantity falls
//! monotonically with frequency across the bracket:
//!
//! - gain search: if the gain at the midpoint is above the target the lower
//!   bound is raised, otherwise the upper bound is lowered;
//! - phase search: if the phase at the midpoint is above -180° the lower bound
//!   is raised, otherwise the upper bound is lowered.
//!
//! This holds for the second-order low-pass plant. For responses with several
//! resonances it does not, and the search settles on *a* crossing (or on a
//! spurious midpoint) without noticing.
//!
//! When the budget runs out before the tolerance is met, the midpoint of the
//! final bracket is returned with `converged == false`. That value is a best
//! effort estimate, not a guaranteed root.

use super::analyzer::SearchConfig;
use super::phasor::{gain_db, phase_degrees, wrap_degrees};
use super::response::FrequencyResponse;
use crate::error::{PowerloopError, Result};

/// Outcome of a bisection search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bisection {
    /// Which search produced this result
    pub search: &'static str,
    /// The root estimate
    pub frequency_hz: f64,
    /// Iterations spent
    pub iterations: usize,
    /// Whether the tolerance was met within the budget
    pub converged: bool,
}

impl Bisection {
    /// The frequency, or [`PowerloopError::NonConvergence`] if the search ran
    /// out of iterations.
    pub fn require_converged(&self) -> Result<f64> {
        if self.converged {
            Ok(self.frequency_hz)
        } else {
            Err(PowerloopError::NonConvergence {
                search: self.search,
                iterations: self.iterations,
                frequency_hz: self.frequency_hz,
            })
        }
    }
}

/// Run the bracket loop on a signed error: positive means "the root is
/// above the midpoint".
fn bisect(
    search: &'static str,
    config: &SearchConfig,
    tolerance: f64,
    error: impl Fn(f64) -> f64,
) -> Bisection {
    let (mut low, mut high) = (config.start_hz, config.end_hz);

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (low + high);
        let e = error(mid);

        if e.abs() < tolerance {
            tracing::debug!(
                search,
                iterations = iteration + 1,
                frequency_hz = mid,
                "bisection converged"
            );
            return Bisection {
                search,
                frequency_hz: mid,
                iterations: iteration + 1,
                converged: true,
            };
        }

        // NaN falls through to the upper-bound branch
        if e > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }

    let frequency_hz = 0.5 * (low + high);
    tracing::warn!(
        search,
        iterations = config.max_iterations,
        frequency_hz,
        "bisection budget exhausted, returning bracket midpoint"
    );
    Bisection {
        search,
        frequency_hz,
        iterations: config.max_iterations,
        converged: false,
    }
}

/// Find the frequency where the gain of `response` equals `target_db`.
///
/// Tolerance is `config.gain_tolerance_db`. Assumes the gain decreases with
/// frequency over `[config.start_hz, config.end_hz]`.
pub fn find_gain_level<R>(response: &R, target_db: f64, config: &SearchConfig) -> Result<Bisection>
where
    R: FrequencyResponse + ?Sized,
{
    config.validate()?;
    Ok(bisect("gain", config, config.gain_tolerance_db, |f| {
        gain_db(response.evaluate(f)) - target_db
    }))
}

/// Find the 0 dB crossover frequency of `response`.
pub fn find_crossover_of<R>(response: &R, config: &SearchConfig) -> Result<Bisection>
where
    R: FrequencyResponse + ?Sized,
{
    config.validate()?;
    Ok(bisect("crossover", config, config.gain_tolerance_db, |f| {
        gain_db(response.evaluate(f))
    }))
}

/// Find the frequency where the phase of `response` reaches -180°.
///
/// Tolerance is `config.phase_tolerance_deg`. The distance to -180° is
/// wrapped into (-180°, 180°], so a phase that has slipped past -180° and
/// been folded to +179° by `atan2` still counts as below the target.
pub fn find_phase_180_of<R>(response: &R, config: &SearchConfig) -> Result<Bisection>
where
    R: FrequencyResponse + ?Sized,
{
    config.validate()?;
    Ok(bisect("phase -180", config, config.phase_tolerance_deg, |f| {
        wrap_degrees(phase_degrees(response.evaluate(f)) + 180.0)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResponseFn;
    use num_complex::Complex64;

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    /// |H| = 1000/f: 0 dB at exactly 1 kHz.
    fn falling_gain() -> ResponseFn<impl Fn(f64) -> Complex64> {
        ResponseFn(|f: f64| Complex64::new(1_000.0 / f, 0.0))
    }

    /// Phase = -f/10 degrees: -180° at exactly 1.8 kHz.
    fn falling_phase() -> ResponseFn<impl Fn(f64) -> Complex64> {
        ResponseFn(|f: f64| Complex64::from_polar(1.0, (-f / 10.0).to_radians()))
    }

    #[test]
    fn test_crossover_converges_to_known_root() {
        let result = find_crossover_of(&falling_gain(), &config()).unwrap();
        assert!(result.converged);
        assert!(result.iterations <= 100);
        assert!(gain_db(falling_gain().evaluate(result.frequency_hz)).abs() < 0.01);
        assert!((result.frequency_hz - 1_000.0).abs() < 1.5);
    }

    #[test]
    fn test_phase_180_converges_to_known_root() {
        let cfg = config().with_bounds(1.0, 3_000.0);
        let result = find_phase_180_of(&falling_phase(), &cfg).unwrap();
        assert!(result.converged);
        assert!(result.iterations <= 100);
        assert!((result.frequency_hz - 1_800.0).abs() < 10.0);
    }

    #[test]
    fn test_searches_are_deterministic() {
        let a = find_crossover_of(&falling_gain(), &config()).unwrap();
        let b = find_crossover_of(&falling_gain(), &config()).unwrap();
        assert_eq!(a, b);

        let cfg = config().with_bounds(1.0, 3_000.0);
        let a = find_phase_180_of(&falling_phase(), &cfg).unwrap();
        let b = find_phase_180_of(&falling_phase(), &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gain_level_search() {
        // -20 dB at 10 kHz
        let result = find_gain_level(&falling_gain(), -20.0, &config()).unwrap();
        assert!(result.converged);
        assert!((result.frequency_hz - 10_000.0).abs() < 15.0);
    }

    #[test]
    fn test_exhausted_budget_returns_midpoint() {
        // Gain never reaches 0 dB: the upper bound keeps being lowered.
        let flat = ResponseFn(|_: f64| Complex64::new(0.5, 0.0));
        let cfg = config().with_bounds(10.0, 20.0).with_max_iterations(3);
        let result = find_crossover_of(&flat, &cfg).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        // [10,20] -> [10,15] -> [10,12.5] -> [10,11.25], midpoint 10.625
        assert_eq!(result.frequency_hz, 10.625);
        assert!(matches!(
            result.require_converged(),
            Err(PowerloopError::NonConvergence { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = config().with_bounds(100.0, 10.0);
        assert!(matches!(
            find_crossover_of(&falling_gain(), &cfg),
            Err(PowerloopError::InvalidRange { .. })
        ));
        let cfg = config().with_max_iterations(0);
        assert!(matches!(
            find_phase_180_of(&falling_phase(), &cfg),
            Err(PowerloopError::InvalidRange { .. })
        ));
    }
}
