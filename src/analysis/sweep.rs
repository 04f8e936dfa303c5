//! Logarithmic frequency sweeps.
//!
//! Points are evenly spaced in log10(f):
//!   step  = (log10(end) - log10(start)) / (n - 1)
//!   f_i   = 10^(log10(start) + i·step)

use super::phasor::{gain_db, phase_degrees};
use super::response::FrequencyResponse;
use crate::error::{PowerloopError, Result};

/// One Bode point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrequencyPoint {
    pub frequency_hz: f64,
    /// `-inf` where the response is the zero phasor
    pub gain_db: f64,
    pub phase_deg: f64,
}

/// Check sweep bounds: `0 < start < end`, both finite, at least two points.
pub fn validate_sweep(start_hz: f64, end_hz: f64, n_points: usize) -> Result<()> {
    if !(start_hz.is_finite() && start_hz > 0.0) {
        return Err(PowerloopError::invalid_range(format!(
            "sweep start must be a positive frequency, got {start_hz}"
        )));
    }
    if !(end_hz.is_finite() && end_hz > start_hz) {
        return Err(PowerloopError::invalid_range(format!(
            "sweep end must be above the start ({start_hz} Hz), got {end_hz}"
        )));
    }
    if n_points < 2 {
        return Err(PowerloopError::invalid_range(format!(
            "sweep needs at least 2 points, got {n_points}"
        )));
    }
    Ok(())
}

/// Logarithmically spaced frequencies from `start_hz` to `end_hz`.
pub fn log_frequencies(start_hz: f64, end_hz: f64, n_points: usize) -> Result<Vec<f64>> {
    validate_sweep(start_hz, end_hz, n_points)?;

    let log_start = start_hz.log10();
    let step = (end_hz.log10() - log_start) / (n_points - 1) as f64;
    Ok((0..n_points)
        .map(|i| 10f64.powf(log_start + i as f64 * step))
        .collect())
}

/// Sweep any response across a logarithmic frequency grid.
///
/// Degenerate points (zero magnitude) are kept with `-inf` gain so the
/// sequence always has `n_points` entries.
pub fn frequency_sweep_of<R>(
    response: &R,
    start_hz: f64,
    end_hz: f64,
    n_points: usize,
) -> Result<Vec<FrequencyPoint>>
where
    R: FrequencyResponse + ?Sized,
{
    let frequencies = log_frequencies(start_hz, end_hz, n_points)?;
    let _span = tracing::info_span!("frequency_sweep", n_points, start_hz, end_hz).entered();

    Ok(frequencies
        .into_iter()
        .map(|frequency_hz| {
            let h = response.evaluate(frequency_hz);
            FrequencyPoint {
                frequency_hz,
                gain_db: gain_db(h),
                phase_deg: phase_degrees(h),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResponseFn;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn test_log_frequencies_decades() {
        let f = log_frequencies(1.0, 1_000.0, 4).unwrap();
        assert_eq!(f.len(), 4);
        assert_relative_eq!(f[0], 1.0);
        assert_relative_eq!(f[1], 10.0, max_relative = 1e-12);
        assert_relative_eq!(f[2], 100.0, max_relative = 1e-12);
        assert_relative_eq!(f[3], 1_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            log_frequencies(0.0, 10.0, 5),
            Err(PowerloopError::InvalidRange { .. })
        ));
        assert!(matches!(
            log_frequencies(-1.0, 10.0, 5),
            Err(PowerloopError::InvalidRange { .. })
        ));
        assert!(matches!(
            log_frequencies(100.0, 10.0, 5),
            Err(PowerloopError::InvalidRange { .. })
        ));
        assert!(matches!(
            log_frequencies(10.0, 10.0, 5),
            Err(PowerloopError::InvalidRange { .. })
        ));
        assert!(matches!(
            log_frequencies(10.0, 100.0, 1),
            Err(PowerloopError::InvalidRange { .. })
        ));
        assert!(log_frequencies(10.0, f64::INFINITY, 5).is_err());
        assert!(log_frequencies(f64::NAN, 10.0, 5).is_err());
    }

    #[test]
    fn test_zero_response_keeps_every_point() {
        let zero = ResponseFn(|_: f64| Complex64::new(0.0, 0.0));
        let points = frequency_sweep_of(&zero, 1.0, 1e3, 7).unwrap();
        assert_eq!(points.len(), 7);
        assert!(points.iter().all(|p| p.gain_db == f64::NEG_INFINITY));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sweep_has_requested_length_and_is_increasing(
            start_exp in -1.0_f64..4.0,
            span_decades in 0.5_f64..4.0,
            n_points in 2_usize..200,
        ) {
            let start = 10f64.powf(start_exp);
            let end = 10f64.powf(start_exp + span_decades);
            let f = log_frequencies(start, end, n_points).unwrap();

            prop_assert_eq!(f.len(), n_points);
            prop_assert!(f.windows(2).all(|w| w[1] > w[0]));
            prop_assert!((f[0] - start).abs() <= start * 1e-12);
            prop_assert!((f[n_points - 1] - end).abs() <= end * 1e-9);
        }
    }
}
