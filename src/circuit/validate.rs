//! Plant validation.

use crate::components::ComponentKind;
use crate::error::{PowerloopError, Result};

use super::{Plant, Schematic};

/// Validate a plant for loop analysis.
///
/// Checks:
/// - R, L and C are all present
/// - Each value is positive and finite
pub fn validate_plant(plant: &Plant) -> Result<()> {
    let (r, l, c) = plant.require_complete()?;
    check_value(&ComponentKind::Resistor.to_string(), r)?;
    check_value(&ComponentKind::Inductor.to_string(), l)?;
    check_value(&ComponentKind::Capacitor.to_string(), c)?;
    Ok(())
}

/// Validate the plant selected from a schematic, reporting component names.
pub fn validate_schematic(schematic: &Schematic) -> Result<()> {
    for kind in [
        ComponentKind::Resistor,
        ComponentKind::Inductor,
        ComponentKind::Capacitor,
    ] {
        let component = schematic
            .first_of(kind)
            .ok_or(PowerloopError::MissingPlantElement { kind })?;
        check_value(&component.name, component.value)?;
    }

    let ignored = schematic
        .components
        .iter()
        .filter(|c| c.kind.is_plant_element())
        .count()
        .saturating_sub(3);
    if ignored > 0 {
        tracing::info!(ignored, "only the first resistor, inductor and capacitor form the plant");
    }

    Ok(())
}

fn check_value(component: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PowerloopError::InvalidParameter {
            component: component.to_string(),
            param: "value".to_string(),
            message: format!("must be positive and finite, got {}", value),
        })
    }
}
