//! Gain and phase of complex phasors.

use std::f64::consts::PI;

use num_complex::Complex64;

/// Gain in decibels, 20·log10(|h|).
///
/// A zero phasor gives `f64::NEG_INFINITY`; this never panics.
pub fn gain_db(h: Complex64) -> f64 {
    20.0 * h.norm().log10()
}

/// Phase in degrees, in (-180°, 180°].
pub fn phase_degrees(h: Complex64) -> f64 {
    let angle = h.im.atan2(h.re);
    // atan2 gives -π on the negative real axis when the imaginary part is -0.0
    if angle == -PI {
        180.0
    } else {
        angle.to_degrees()
    }
}

/// Fold an angle in degrees into (-180°, 180°].
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gain_db() {
        assert_abs_diff_eq!(gain_db(Complex64::new(1.0, 0.0)), 0.0);
        assert_abs_diff_eq!(gain_db(Complex64::new(0.0, 10.0)), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gain_db(Complex64::new(0.1, 0.0)), -20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gain_of_zero_is_negative_infinity() {
        let g = gain_db(Complex64::new(0.0, 0.0));
        assert!(g.is_infinite() && g < 0.0);
    }

    #[test]
    fn test_phase_degrees_range() {
        assert_abs_diff_eq!(phase_degrees(Complex64::new(0.0, -1.0)), -90.0);
        assert_abs_diff_eq!(phase_degrees(Complex64::new(-1.0, 0.0)), 180.0);
        assert_abs_diff_eq!(
            phase_degrees(Complex64::new(-1.0, -1e-12)),
            -180.0,
            epsilon = 1e-9
        );
        assert_eq!(phase_degrees(Complex64::new(0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_phase_of_negative_real_with_negative_zero() {
        assert_eq!(phase_degrees(Complex64::new(-1.0, -0.0)), 180.0);
        assert_eq!(phase_degrees(Complex64::new(-1.0, 0.0)), 180.0);
        assert_eq!(phase_degrees(Complex64::new(-2.5, -0.0) * 2.0), 180.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_abs_diff_eq!(wrap_degrees(0.0), 0.0);
        assert_abs_diff_eq!(wrap_degrees(180.0), 180.0);
        assert_abs_diff_eq!(wrap_degrees(-180.0), 180.0);
        assert_abs_diff_eq!(wrap_degrees(359.5), -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_degrees(-190.0), 170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_degrees(725.0), 5.0, epsilon = 1e-12);
    }
}
