//! The frequency-response seam shared by sweeps and margin searches.

use num_complex::Complex64;

use crate::circuit::Plant;

/// Anything with a complex response at a given frequency.
///
/// The sweep and bisection routines are written once against this trait and
/// run unchanged over the bare plant, a compensator, the compensated open loop
/// or the closed loop.
pub trait FrequencyResponse {
    /// Evaluate the response at `frequency_hz` (s = j·2π·f).
    fn evaluate(&self, frequency_hz: f64) -> Complex64;
}

impl<T: FrequencyResponse + ?Sized> FrequencyResponse for &T {
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        (**self).evaluate(frequency_hz)
    }
}

impl FrequencyResponse for Plant {
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        self.transfer_function(frequency_hz)
    }
}

/// Adapts a closure into a [`FrequencyResponse`].
///
/// ```
/// use num_complex::Complex64;
/// use powerloop_core::analysis::{FrequencyResponse, ResponseFn};
///
/// let integrator = ResponseFn(|f: f64| Complex64::new(0.0, -1_000.0 / f));
/// assert_eq!(integrator.evaluate(1_000.0), Complex64::new(0.0, -1.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResponseFn<F>(pub F);

impl<F> FrequencyResponse for ResponseFn<F>
where
    F: Fn(f64) -> Complex64,
{
    fn evaluate(&self, frequency_hz: f64) -> Complex64 {
        (self.0)(frequency_hz)
    }
}
