//! Compensator synthesis from crossover and phase-margin targets.
//!
//! Every design starts from the same normalization: the compensator's
//! proportional gain is set to 1/|H(f_c)| so that the open loop sits at 0 dB
//! at the target crossover f_c. Zeros and poles are then placed at fixed
//! ratios of f_c:
//!
//! | Type | Zeros | Poles |
//! |------|-------|-------|
//! | Type 2 | f_c/10 | - |
//! | Type 3 | f_c/10, f_c/5 | 5·f_c, 10·f_c |
//!
//! The phase boost needed to reach the target margin is computed and reported
//! but does not move any zero or pole.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::feedback::CompensatedLoop;
use super::{compensator_tf, Compensator, CompensatorType};
use crate::analysis::{gain_db, phase_degrees, Bisection, SearchConfig, StabilityMargins};
use crate::circuit::Plant;
use crate::error::{PowerloopError, Result};

/// Type 2 zero sits this many times below the crossover.
const TYPE2_ZERO_RATIO: f64 = 10.0;
/// Type 3 zeros, as divisors of the crossover.
const TYPE3_ZERO_RATIOS: [f64; 2] = [10.0, 5.0];
/// Type 3 poles, as multiples of the crossover.
const TYPE3_POLE_RATIOS: [f64; 2] = [5.0, 10.0];

/// Integrator design.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Type1Design {
    pub ki: f64,
    pub crossover_hz: f64,
}

impl Type1Design {
    pub fn compensator(&self) -> Compensator {
        Compensator::type1(self.ki)
    }
}

/// PI design.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Type2Design {
    pub kp: f64,
    pub ki: f64,
    pub crossover_hz: f64,
    pub zero_hz: f64,
    /// Informational; the zero is placed at a fixed ratio regardless
    pub required_phase_boost_deg: f64,
}

impl Type2Design {
    pub fn compensator(&self) -> Compensator {
        Compensator::type2(self.kp, self.ki)
    }
}

/// PID design with two reported high-frequency poles.
///
/// Only `zero1_hz` and `pole1_hz` feed the coefficients. `zero2_hz` and
/// `pole2_hz` describe the intended filtered shape; the three-term evaluator
/// does not model them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Type3Design {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub crossover_hz: f64,
    pub zero1_hz: f64,
    pub zero2_hz: f64,
    pub pole1_hz: f64,
    pub pole2_hz: f64,
    /// Informational; zeros and poles are placed at fixed ratios regardless
    pub required_phase_boost_deg: f64,
}

impl Type3Design {
    pub fn compensator(&self) -> Compensator {
        Compensator::type3(self.kp, self.ki, self.kd)
    }
}

/// Any of the three designs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub enum Design {
    Type1(Type1Design),
    Type2(Type2Design),
    Type3(Type3Design),
}

impl Design {
    /// The compensator type.
    pub fn kind(&self) -> CompensatorType {
        match self {
            Self::Type1(_) => CompensatorType::Type1,
            Self::Type2(_) => CompensatorType::Type2,
            Self::Type3(_) => CompensatorType::Type3,
        }
    }

    /// The designed compensator.
    pub fn compensator(&self) -> Compensator {
        match self {
            Self::Type1(d) => d.compensator(),
            Self::Type2(d) => d.compensator(),
            Self::Type3(d) => d.compensator(),
        }
    }

    /// The crossover the design targets.
    pub fn crossover_hz(&self) -> f64 {
        match self {
            Self::Type1(d) => d.crossover_hz,
            Self::Type2(d) => d.crossover_hz,
            Self::Type3(d) => d.crossover_hz,
        }
    }
}

/// Plant gain and phase at the target crossover.
struct PlantAtCrossover {
    /// 10^(-gain_dB/20)
    normalizing_gain: f64,
    phase_deg: f64,
}

/// Synthesizes and verifies compensators for one plant.
#[derive(Debug, Clone)]
pub struct CompensatorDesigner {
    plant: Plant,
    config: SearchConfig,
}

impl CompensatorDesigner {
    /// Create a designer verifying over the default 1 Hz – 1 MHz bounds.
    pub fn new(plant: Plant) -> Self {
        Self {
            plant,
            config: SearchConfig::default(),
        }
    }

    /// Create a designer with custom verification bounds and tolerances.
    pub fn with_config(plant: Plant, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { plant, config })
    }

    /// The plant being compensated.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// The verification search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn plant_at_crossover(&self, crossover_hz: f64) -> Result<PlantAtCrossover> {
        self.plant.require_complete()?;
        if !(crossover_hz.is_finite() && crossover_hz > 0.0) {
            return Err(PowerloopError::invalid_range(format!(
                "target crossover must be a positive frequency, got {crossover_hz}"
            )));
        }

        let h = self.plant.transfer_function(crossover_hz);
        Ok(PlantAtCrossover {
            normalizing_gain: 10f64.powf(-gain_db(h) / 20.0),
            phase_deg: phase_degrees(h),
        })
    }

    /// Phase the compensator must add on top of its integrator's -90° for
    /// the loop to reach `target_phase_margin_deg`.
    fn required_phase_boost(plant_phase_deg: f64, target_phase_margin_deg: f64) -> Result<f64> {
        if !target_phase_margin_deg.is_finite() {
            return Err(PowerloopError::invalid_range(format!(
                "target phase margin must be finite, got {target_phase_margin_deg}"
            )));
        }
        Ok(target_phase_margin_deg - plant_phase_deg - 90.0)
    }

    /// Integrator sized for 0 dB open-loop gain at the target crossover.
    pub fn design_type1(&self, target_crossover_hz: f64) -> Result<Type1Design> {
        let at = self.plant_at_crossover(target_crossover_hz)?;
        let ki = at.normalizing_gain * 2.0 * PI * target_crossover_hz;

        tracing::debug!(target_crossover_hz, ki, "type 1 design");
        Ok(Type1Design {
            ki,
            crossover_hz: target_crossover_hz,
        })
    }

    /// PI compensator with its zero a decade below the crossover.
    pub fn design_type2(
        &self,
        target_crossover_hz: f64,
        target_phase_margin_deg: f64,
    ) -> Result<Type2Design> {
        let at = self.plant_at_crossover(target_crossover_hz)?;
        let required_phase_boost_deg =
            Self::required_phase_boost(at.phase_deg, target_phase_margin_deg)?;

        let gain = at.normalizing_gain;
        let zero_hz = target_crossover_hz / TYPE2_ZERO_RATIO;
        let design = Type2Design {
            kp: gain,
            ki: gain * 2.0 * PI * zero_hz,
            crossover_hz: target_crossover_hz,
            zero_hz,
            required_phase_boost_deg,
        };

        tracing::debug!(
            target_crossover_hz,
            target_phase_margin_deg,
            kp = design.kp,
            ki = design.ki,
            zero_hz,
            required_phase_boost_deg,
            "type 2 design"
        );
        Ok(design)
    }

    /// PID compensator with zeros at f_c/10, f_c/5 and poles at 5·f_c, 10·f_c.
    pub fn design_type3(
        &self,
        target_crossover_hz: f64,
        target_phase_margin_deg: f64,
    ) -> Result<Type3Design> {
        let at = self.plant_at_crossover(target_crossover_hz)?;
        let required_phase_boost_deg =
            Self::required_phase_boost(at.phase_deg, target_phase_margin_deg)?;

        let gain = at.normalizing_gain;
        let [zero1_hz, zero2_hz] = TYPE3_ZERO_RATIOS.map(|r| target_crossover_hz / r);
        let [pole1_hz, pole2_hz] = TYPE3_POLE_RATIOS.map(|r| target_crossover_hz * r);
        let design = Type3Design {
            kp: gain,
            ki: gain * 2.0 * PI * zero1_hz,
            kd: gain / (2.0 * PI * pole1_hz),
            crossover_hz: target_crossover_hz,
            zero1_hz,
            zero2_hz,
            pole1_hz,
            pole2_hz,
            required_phase_boost_deg,
        };

        tracing::debug!(
            target_crossover_hz,
            target_phase_margin_deg,
            kp = design.kp,
            ki = design.ki,
            kd = design.kd,
            required_phase_boost_deg,
            "type 3 design"
        );
        Ok(design)
    }

    /// Design a compensator of the given type. Type 1 ignores the phase margin.
    pub fn design(
        &self,
        kind: CompensatorType,
        target_crossover_hz: f64,
        target_phase_margin_deg: f64,
    ) -> Result<Design> {
        match kind {
            CompensatorType::Type1 => self.design_type1(target_crossover_hz).map(Design::Type1),
            CompensatorType::Type2 => self
                .design_type2(target_crossover_hz, target_phase_margin_deg)
                .map(Design::Type2),
            CompensatorType::Type3 => self
                .design_type3(target_crossover_hz, target_phase_margin_deg)
                .map(Design::Type3),
        }
    }

    /// Evaluate a compensator from its raw parameter list.
    pub fn compensator_tf(
        &self,
        frequency_hz: f64,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<Complex64> {
        compensator_tf(frequency_hz, kind, params)
    }

    /// Plant × compensator at `frequency_hz`.
    pub fn open_loop_tf(
        &self,
        frequency_hz: f64,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<Complex64> {
        Ok(self.compensated_loop(kind, params)?.open_loop(frequency_hz))
    }

    /// Open/(1+open) at `frequency_hz`. NaN phasor for a singular loop.
    pub fn closed_loop_tf(
        &self,
        frequency_hz: f64,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<Complex64> {
        Ok(self.compensated_loop(kind, params)?.closed_loop(frequency_hz))
    }

    /// The loop closed around this plant by the given compensator.
    pub fn compensated_loop(
        &self,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<CompensatedLoop> {
        let compensator = Compensator::new(kind, params)?;
        Ok(CompensatedLoop::new(self.plant, compensator))
    }

    /// Re-run the crossover and -180° searches on the compensated open loop.
    ///
    /// A verified crossover or phase margin far from the target means the
    /// fixed-ratio placement under- or over-compensated this plant.
    pub fn verify_design(
        &self,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<StabilityMargins> {
        let margins = self.compensated_loop(kind, params)?.margins(&self.config)?;
        tracing::debug!(
            compensator = %kind,
            crossover_hz = margins.crossover_hz(),
            phase_margin_deg = margins.phase_margin_deg,
            signed_phase_margin_deg = margins.signed_phase_margin_deg,
            gain_margin_db = margins.gain_margin_db,
            converged = margins.converged(),
            "design verified"
        );
        Ok(margins)
    }

    /// -3 dB bandwidth of the compensated closed loop.
    pub fn closed_loop_bandwidth(
        &self,
        kind: CompensatorType,
        params: &[f64],
    ) -> Result<Bisection> {
        self.compensated_loop(kind, params)?.closed_loop_bandwidth(&self.config)
    }
}
