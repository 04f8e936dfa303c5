//! Component models for plant analysis.
//!
//! A schematic may hold any of the supported kinds:
//! - Passive: Resistor, Capacitor, Inductor
//! - Sources: Voltage Source, Current Source
//! - Semiconductors: Diode, MOSFET, BJT, Op-Amp
//!
//! Only the three passive kinds have an impedance. Everything else is inert
//! with respect to the plant transfer function and reports a zero phasor.

mod linear;

pub use linear::{capacitor_impedance, inductor_impedance, resistor_impedance};

use std::fmt;

use num_complex::Complex64;

use crate::dsl::ComponentDef;
use crate::error::{PowerloopError, Result};

/// The kind tag of a schematic component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    Diode,
    Mosfet,
    Bjt,
    OpAmp,
}

impl ComponentKind {
    /// Infer the kind from a component name such as `R1`, `Lout` or `OP2`.
    ///
    /// Multi-character prefixes are checked before single characters so that
    /// `OP1` is an op-amp rather than an unknown `O` part.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.starts_with("OP") {
            return Some(Self::OpAmp);
        }
        match upper.chars().next()? {
            'R' => Some(Self::Resistor),
            'C' => Some(Self::Capacitor),
            'L' => Some(Self::Inductor),
            'V' => Some(Self::VoltageSource),
            'I' => Some(Self::CurrentSource),
            'D' => Some(Self::Diode),
            'M' => Some(Self::Mosfet),
            'Q' => Some(Self::Bjt),
            'U' => Some(Self::OpAmp),
            _ => None,
        }
    }

    /// Whether this kind takes part in the R-L-C plant.
    pub fn is_plant_element(&self) -> bool {
        matches!(self, Self::Resistor | Self::Capacitor | Self::Inductor)
    }

    /// Whether a description line for this kind must carry a value.
    pub fn requires_value(&self) -> bool {
        self.is_plant_element()
    }

    /// Conventional unit label used when none is given.
    pub fn default_unit(&self) -> Option<&'static str> {
        match self {
            Self::Resistor => Some("Ω"),
            Self::Capacitor => Some("F"),
            Self::Inductor => Some("H"),
            Self::VoltageSource => Some("V"),
            Self::CurrentSource => Some("A"),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Inductor => "inductor",
            Self::VoltageSource => "voltage source",
            Self::CurrentSource => "current source",
            Self::Diode => "diode",
            Self::Mosfet => "MOSFET",
            Self::Bjt => "BJT",
            Self::OpAmp => "op-amp",
        };
        f.write_str(name)
    }
}

/// A schematic component as seen by the analysis core.
///
/// Components are plain values. Nothing in this crate mutates one after it is
/// built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    /// Value in base SI units (ohms, farads, henries, volts, ...)
    pub value: f64,
    /// Optional display unit label
    pub unit: Option<String>,
}

impl Component {
    /// Create a new component without a unit label.
    pub fn new(kind: ComponentKind, name: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            value,
            unit: None,
        }
    }

    /// Create a resistor.
    pub fn resistor(name: impl Into<String>, ohms: f64) -> Self {
        Self::new(ComponentKind::Resistor, name, ohms)
    }

    /// Create a capacitor.
    pub fn capacitor(name: impl Into<String>, farads: f64) -> Self {
        Self::new(ComponentKind::Capacitor, name, farads)
    }

    /// Create an inductor.
    pub fn inductor(name: impl Into<String>, henries: f64) -> Self {
        Self::new(ComponentKind::Inductor, name, henries)
    }

    /// Attach a unit label.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Unit label to display, falling back to the kind's convention.
    pub fn unit_label(&self) -> Option<&str> {
        self.unit.as_deref().or_else(|| self.kind.default_unit())
    }

    /// Create a component from a description-file definition.
    pub fn from_def(def: &ComponentDef) -> Result<Self> {
        let value = match def.value {
            Some(v) => v,
            None if def.kind.requires_value() => {
                return Err(PowerloopError::invalid_component(
                    &def.name,
                    def.line,
                    format!("{} requires a value", def.kind),
                ));
            }
            None => 0.0,
        };

        Ok(Self {
            kind: def.kind,
            name: def.name.clone(),
            value,
            unit: def.unit.clone(),
        })
    }

    /// Impedance of this component at `frequency_hz`.
    ///
    /// See [`impedance`].
    pub fn impedance(&self, frequency_hz: f64) -> Complex64 {
        match self.kind {
            ComponentKind::Resistor => resistor_impedance(self.value),
            ComponentKind::Capacitor => capacitor_impedance(self.value, frequency_hz),
            ComponentKind::Inductor => inductor_impedance(self.value, frequency_hz),
            _ => Complex64::new(0.0, 0.0),
        }
    }
}

/// Impedance of a single component at `frequency_hz`.
///
/// Resistors are purely real, capacitors and inductors purely imaginary, and
/// every other kind is the zero phasor. The frequency must be positive: a
/// capacitor at 0 Hz has an infinite reactance and comes back as `-inf` in the
/// imaginary part rather than as an error.
pub fn impedance(component: &Component, frequency_hz: f64) -> Complex64 {
    component.impedance(frequency_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ComponentKind::from_name("R1"), Some(ComponentKind::Resistor));
        assert_eq!(ComponentKind::from_name("lout"), Some(ComponentKind::Inductor));
        assert_eq!(ComponentKind::from_name("OP1"), Some(ComponentKind::OpAmp));
        assert_eq!(ComponentKind::from_name("U3"), Some(ComponentKind::OpAmp));
        assert_eq!(ComponentKind::from_name("M1"), Some(ComponentKind::Mosfet));
        assert_eq!(ComponentKind::from_name("X1"), None);
        assert_eq!(ComponentKind::from_name(""), None);
    }

    #[test]
    fn test_inert_kinds_have_zero_impedance() {
        for kind in [
            ComponentKind::VoltageSource,
            ComponentKind::CurrentSource,
            ComponentKind::Diode,
            ComponentKind::Mosfet,
            ComponentKind::Bjt,
            ComponentKind::OpAmp,
        ] {
            let z = Component::new(kind, "X", 12.0).impedance(1_000.0);
            assert_eq!(z, Complex64::new(0.0, 0.0), "{kind}");
        }
    }

    #[test]
    fn test_unit_label_fallback() {
        assert_eq!(Component::inductor("L1", 1e-3).unit_label(), Some("H"));
        assert_eq!(
            Component::resistor("R1", 1.0).with_unit("Ohm").unit_label(),
            Some("Ohm")
        );
        assert_eq!(Component::new(ComponentKind::Diode, "D1", 0.0).unit_label(), None);
    }

    #[test]
    fn test_from_def_requires_value_for_passives() {
        let def = ComponentDef {
            kind: ComponentKind::Capacitor,
            name: "C1".to_string(),
            value: None,
            unit: None,
            line: 3,
        };
        let err = Component::from_def(&def).unwrap_err();
        assert!(matches!(err, PowerloopError::InvalidComponent { line: 3, .. }));

        let def = ComponentDef {
            kind: ComponentKind::Mosfet,
            name: "M1".to_string(),
            value: None,
            unit: None,
            line: 4,
        };
        assert_eq!(Component::from_def(&def).unwrap().value, 0.0);
    }
}
