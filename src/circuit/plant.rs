//! The R-L-C plant seen by the loop.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::components::{Component, ComponentKind};
use crate::error::{PowerloopError, Result};

/// A single-loop second-order plant: one resistor, one inductor and one
/// capacitor.
///
/// ```text
///            R
///   H(s) = -----------------
///          LC s² + RC s + 1
/// ```
///
/// Any element may be absent. An incomplete plant is *degenerate*: its
/// transfer function is the zero phasor at every frequency and the margin
/// searches refuse to run on it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Plant {
    /// Ohms
    pub resistance: Option<f64>,
    /// Henries
    pub inductance: Option<f64>,
    /// Farads
    pub capacitance: Option<f64>,
}

impl Plant {
    /// Create a complete plant.
    pub fn new(resistance: f64, inductance: f64, capacitance: f64) -> Self {
        Self {
            resistance: Some(resistance),
            inductance: Some(inductance),
            capacitance: Some(capacitance),
        }
    }

    /// Select the plant from an ordered component list.
    ///
    /// The first resistor, first inductor and first capacitor win. Later
    /// elements of the same kind are ignored, not combined.
    pub fn from_components(components: &[Component]) -> Self {
        let first = |kind: ComponentKind| {
            components
                .iter()
                .find(|c| c.kind == kind)
                .map(|c| c.value)
        };

        Self {
            resistance: first(ComponentKind::Resistor),
            inductance: first(ComponentKind::Inductor),
            capacitance: first(ComponentKind::Capacitor),
        }
    }

    /// The first missing element, if any.
    pub fn missing_element(&self) -> Option<ComponentKind> {
        if self.resistance.is_none() {
            Some(ComponentKind::Resistor)
        } else if self.inductance.is_none() {
            Some(ComponentKind::Inductor)
        } else if self.capacitance.is_none() {
            Some(ComponentKind::Capacitor)
        } else {
            None
        }
    }

    /// Whether R, L and C are all present.
    pub fn is_complete(&self) -> bool {
        self.missing_element().is_none()
    }

    /// `(R, L, C)`, or [`PowerloopError::MissingPlantElement`].
    pub fn require_complete(&self) -> Result<(f64, f64, f64)> {
        let missing = |kind| PowerloopError::MissingPlantElement { kind };
        let r = self.resistance.ok_or(missing(ComponentKind::Resistor))?;
        let l = self.inductance.ok_or(missing(ComponentKind::Inductor))?;
        let c = self.capacitance.ok_or(missing(ComponentKind::Capacitor))?;
        Ok((r, l, c))
    }

    /// Evaluate H(jω) at `frequency_hz`.
    ///
    /// Returns the zero phasor for a degenerate plant.
    pub fn transfer_function(&self, frequency_hz: f64) -> Complex64 {
        let Ok((r, l, c)) = self.require_complete() else {
            return Complex64::new(0.0, 0.0);
        };

        let omega = 2.0 * PI * frequency_hz;
        // s = jω: LC s² = -LCω², RC s = jRCω
        let denominator = Complex64::new(1.0 - l * c * omega * omega, r * c * omega);
        Complex64::new(r, 0.0) / denominator
    }

    /// Undamped natural frequency f₀ = 1/(2π√(LC)).
    pub fn natural_frequency_hz(&self) -> Option<f64> {
        let (l, c) = (self.inductance?, self.capacitance?);
        Some(1.0 / (2.0 * PI * (l * c).sqrt()))
    }

    /// Quality factor Q = √(L/C)/R of the resonance.
    pub fn quality_factor(&self) -> Option<f64> {
        let (r, l, c) = self.require_complete().ok()?;
        Some((l / c).sqrt() / r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_plant() -> Plant {
        Plant::new(1.0, 1e-3, 1e-6)
    }

    #[test]
    fn test_first_encountered_selection() {
        let components = vec![
            Component::new(ComponentKind::VoltageSource, "VIN", 12.0),
            Component::inductor("L1", 1e-3),
            Component::resistor("R1", 1.0),
            Component::inductor("L2", 5e-3),
            Component::capacitor("C1", 1e-6),
            Component::resistor("R2", 100.0),
        ];
        let plant = Plant::from_components(&components);
        assert_eq!(plant, reference_plant());
    }

    #[test]
    fn test_missing_inductor_is_degenerate() {
        let components = vec![
            Component::resistor("R1", 1.0),
            Component::capacitor("C1", 1e-6),
        ];
        let plant = Plant::from_components(&components);
        assert_eq!(plant.missing_element(), Some(ComponentKind::Inductor));
        assert!(!plant.is_complete());
        for f in [1.0, 5_033.0, 1e6] {
            assert_eq!(plant.transfer_function(f), Complex64::new(0.0, 0.0));
        }
        assert!(matches!(
            plant.require_complete(),
            Err(PowerloopError::MissingPlantElement {
                kind: ComponentKind::Inductor
            })
        ));
    }

    #[test]
    fn test_dc_gain_equals_resistance() {
        let plant = Plant::new(2.5, 1e-3, 1e-6);
        let h = plant.transfer_function(1e-3);
        assert_relative_eq!(h.re, 2.5, max_relative = 1e-6);
        assert!(h.im.abs() < 1e-6);
    }

    #[test]
    fn test_resonance_magnitude() {
        // At ω₀ the real part of the denominator vanishes, leaving |H| = R/(RCω₀).
        let plant = reference_plant();
        let f0 = plant.natural_frequency_hz().unwrap();
        assert_relative_eq!(f0, 5_032.921, max_relative = 1e-6);

        let omega0 = 2.0 * PI * f0;
        let expected = 1.0 / (1.0 * 1e-6 * omega0);
        let h = plant.transfer_function(f0);
        assert_relative_eq!(h.norm(), expected, max_relative = 1e-9);
        // Purely imaginary and lagging by 90°
        assert_relative_eq!(h.arg(), -PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quality_factor() {
        let q = reference_plant().quality_factor().unwrap();
        assert_relative_eq!(q, 31.622_776, max_relative = 1e-6);
    }
}
