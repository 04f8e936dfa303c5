//! Linear passive components: Resistor, Capacitor, Inductor.
//!
//! Impedances at s = jω, ω = 2πf:
//!   Z_R = R
//!   Z_C = 1/(jωC) = -j/(ωC)
//!   Z_L = jωL

use std::f64::consts::PI;

use num_complex::Complex64;

/// Impedance of a resistor. Frequency independent.
pub fn resistor_impedance(resistance: f64) -> Complex64 {
    Complex64::new(resistance, 0.0)
}

/// Impedance of a capacitor at `frequency_hz`.
///
/// At 0 Hz the reactance is infinite; the imaginary part is `-inf`.
pub fn capacitor_impedance(capacitance: f64, frequency_hz: f64) -> Complex64 {
    let omega = 2.0 * PI * frequency_hz;
    Complex64::new(0.0, -1.0 / (omega * capacitance))
}

/// Impedance of an inductor at `frequency_hz`.
pub fn inductor_impedance(inductance: f64, frequency_hz: f64) -> Complex64 {
    let omega = 2.0 * PI * frequency_hz;
    Complex64::new(0.0, omega * inductance)
}
