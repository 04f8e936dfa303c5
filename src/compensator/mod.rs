//! Feedback compensators and loop synthesis.
//!
//! | Type | Parameters | C(s) |
//! |------|------------|------|
//! | Type 1 | `[Ki]` | Ki/s |
//! | Type 2 | `[Kp, Ki]` | Kp + Ki/s |
//! | Type 3 | `[Kp, Ki, Kd]` | Kp + Ki/s + Kd·s |
//!
//! [`CompensatorDesigner`] derives the parameters from a target crossover and
//! phase margin, and verifies a design by re-running the plant analyzer's
//! margin searches on the compensated open loop.

mod design;
mod feedback;

pub use design::{CompensatorDesigner, Design, Type1Design, Type2Design, Type3Design};
pub use feedback::{closed_loop_from_open, ClosedLoop, CompensatedLoop};

use std::f64::consts::PI;
use std::fmt;

use num_complex::Complex64;

use crate::analysis::FrequencyResponse;
use crate::error::{PowerloopError, Result};

/// Compensator topology tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompensatorType {
    /// Pure integrator
    Type1,
    /// PI
    Type2,
    /// PID
    Type3,
}

impl CompensatorType {
    /// Number of parameters this type takes.
    pub fn arity(&self) -> usize {
        self.parameter_names().len()
    }

    /// Parameter names, in order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Self::Type1 => &["Ki"],
            Self::Type2 => &["Kp", "Ki"],
            Self::Type3 => &["Kp", "Ki", "Kd"],
        }
    }

    /// Parse `type1`, `2`, `pi`, `pid`, ...
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "type1" | "1" | "i" | "integrator" => Some(Self::Type1),
            "type2" | "2" | "pi" => Some(Self::Type2),
            "type3" | "3" | "pid" => Some(Self::Type3),
            _ => None,
        }
    }
}

impl fmt::Display for CompensatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type1 => f.write_str("Type 1"),
            Self::Type2 => f.write_str("Type 2"),
            Self::Type3 => f.write_str("Type 3"),
        }
    }
}

/// A compensator: a type tag plus its ordered parameter list.
///
/// The arity is checked once on construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Compensator {
    kind: CompensatorType,
    params: Vec<f64>,
}

impl Compensator {
    /// Create a compensator, checking the parameter count.
    pub fn new(kind: CompensatorType, params: impl Into<Vec<f64>>) -> Result<Self> {
        let params = params.into();
        check_arity(kind, &params)?;
        Ok(Self { kind, params })
    }

    /// Ki/s
    pub fn type1(ki: f64) -> Self {
        Self {
            kind: CompensatorType::Type1,
            params: vec![ki],
        }
    }

    /// Kp + Ki/s
    pub fn type2(kp: f64, ki: f64) -> Self {
        Self {
            kind: CompensatorType::Type2,
            params: vec![kp, ki],
        }
    }

    /// Kp + Ki/s + Kd·s
    pub fn type3(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kind: CompensatorType::Type3,
            params: vec![kp, ki, kd],
        }
    }

    /// The type tag.
    pub fn kind(&self) -> CompensatorType {
        self.kind
    }

    /// The ordered parameters.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// C(jω) at `frequency_hz`.
    pub fn transfer_function(&self, frequency_hz: f64) -> Complex64 {
        evaluate(self.kind, &self.params, frequency_hz)
    }
}

impl FrequencyResponse for Compensator {
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        self.transfer_function(frequency_hz)
    }
}

fn check_arity(kind: CompensatorType, params: &[f64]) -> Result<()> {
    if params.len() != kind.arity() {
        return Err(PowerloopError::ArityMismatch {
            compensator: kind,
            expected: kind.arity(),
            got: params.len(),
        });
    }
    Ok(())
}

/// Arity already checked.
fn evaluate(kind: CompensatorType, params: &[f64], frequency_hz: f64) -> Complex64 {
    let s = Complex64::new(0.0, 2.0 * PI * frequency_hz);
    match kind {
        CompensatorType::Type1 => params[0] / s,
        CompensatorType::Type2 => params[0] + params[1] / s,
        CompensatorType::Type3 => params[0] + params[1] / s + params[2] * s,
    }
}

/// Evaluate a compensator given as a type tag and a raw parameter list.
///
/// Fails with [`PowerloopError::ArityMismatch`] when the list length does not
/// match the type; extra parameters are never silently ignored.
pub fn compensator_tf(
    frequency_hz: f64,
    kind: CompensatorType,
    params: &[f64],
) -> Result<Complex64> {
    check_arity(kind, params)?;
    Ok(evaluate(kind, params, frequency_hz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_type1_is_integrator() {
        // Ki/(jω) at ω = Ki is -j
        let ki = 2.0 * PI * 100.0;
        let c = compensator_tf(100.0, CompensatorType::Type1, &[ki]).unwrap();
        assert!(c.re.abs() < 1e-12);
        assert_relative_eq!(c.im, -1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_type2_zero_location() {
        // Kp + Ki/s has its zero at Ki/Kp rad/s: |C| = √2·Kp, ∠C = -45°
        let kp = 3.0;
        let ki = kp * 2.0 * PI * 1_000.0;
        let c = compensator_tf(1_000.0, CompensatorType::Type2, &[kp, ki]).unwrap();
        assert_relative_eq!(c.norm(), kp * 2f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(c.arg().to_degrees(), -45.0, max_relative = 1e-12);
    }

    #[test]
    fn test_type3_derivative_term() {
        let s = Complex64::new(0.0, 2.0 * PI * 5_000.0);
        let c = compensator_tf(5_000.0, CompensatorType::Type3, &[1.0, 10.0, 1e-4]).unwrap();
        let expected = 1.0 + 10.0 / s + 1e-4 * s;
        assert_relative_eq!(c.re, expected.re, max_relative = 1e-12);
        assert_relative_eq!(c.im, expected.im, max_relative = 1e-12);
    }

    #[test]
    fn test_arity_mismatch() {
        let err = compensator_tf(1_000.0, CompensatorType::Type2, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            PowerloopError::ArityMismatch {
                compensator: CompensatorType::Type2,
                expected: 2,
                got: 3
            }
        ));
        assert!(Compensator::new(CompensatorType::Type3, vec![1.0]).is_err());
        assert!(Compensator::new(CompensatorType::Type1, vec![]).is_err());
    }

    #[test]
    fn test_constructors_agree_with_new() {
        assert_eq!(
            Compensator::type3(1.0, 2.0, 3.0),
            Compensator::new(CompensatorType::Type3, [1.0, 2.0, 3.0]).unwrap()
        );
        assert_eq!(Compensator::type1(4.0).params(), &[4.0]);
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(CompensatorType::from_keyword("TYPE2"), Some(CompensatorType::Type2));
        assert_eq!(CompensatorType::from_keyword("pid"), Some(CompensatorType::Type3));
        assert_eq!(CompensatorType::from_keyword("1"), Some(CompensatorType::Type1));
        assert_eq!(CompensatorType::from_keyword("type4"), None);
    }
}
