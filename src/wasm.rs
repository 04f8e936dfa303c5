//! WASM bindings for Powerloop Core.
//!
//! Results cross the boundary as flat `Float64Array`s so that a browser
//! front end can plot them without a serialization layer.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLoopDesigner } from 'powerloop_core';
//!
//! await init();
//!
//! const designer = new WasmLoopDesigner(`
//!   R1 1   Ohm
//!   L1 1m  H
//!   C1 1u  F
//! `);
//!
//! // [f0, gain0, phase0, f1, gain1, phase1, ...]
//! const bode = designer.sweep(10, 1e6, 100);
//! const [fc, pm, f180, gm, signedPm] = designer.margins();
//! const params = designer.design("type2", 10e3, 45);
//! ```

use wasm_bindgen::prelude::*;

use crate::analysis::{FrequencyPoint, PlantAnalyzer, StabilityMargins};
use crate::circuit::{validate_schematic, Schematic};
use crate::compensator::{CompensatorDesigner, CompensatorType};
use crate::dsl;
use crate::error::PowerloopError;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(error: PowerloopError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Loop analysis and compensator design for one plant description.
#[wasm_bindgen]
pub struct WasmLoopDesigner {
    schematic: Schematic,
}

#[wasm_bindgen]
impl WasmLoopDesigner {
    /// Parse and validate a plant description.
    ///
    /// # Example
    /// ```javascript
    /// const designer = new WasmLoopDesigner(plantDsl);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(plant_dsl: &str) -> Result<WasmLoopDesigner, JsValue> {
        let ast = dsl::parse(plant_dsl).map_err(to_js)?;
        let schematic = Schematic::from_ast(ast).map_err(to_js)?;
        validate_schematic(&schematic).map_err(to_js)?;
        Ok(WasmLoopDesigner { schematic })
    }

    /// Bode sweep of the plant, flattened as `[f, gain_db, phase_deg, ...]`.
    #[wasm_bindgen]
    pub fn sweep(
        &self,
        start_hz: f64,
        end_hz: f64,
        n_points: usize,
    ) -> Result<Vec<f64>, JsValue> {
        let points = PlantAnalyzer::new(self.schematic.plant())
            .frequency_sweep(start_hz, end_hz, n_points)
            .map_err(to_js)?;
        Ok(flatten_points(&points))
    }

    /// Plant margins as `[crossover_hz, phase_margin_deg, phase_crossover_hz,
    /// gain_margin_db, signed_phase_margin_deg]`.
    #[wasm_bindgen]
    pub fn margins(&self) -> Result<Vec<f64>, JsValue> {
        let margins = PlantAnalyzer::with_config(self.schematic.plant(), self.schematic.search)
            .and_then(|analyzer| analyzer.margins())
            .map_err(to_js)?;
        Ok(flatten_margins(&margins))
    }

    /// Design a compensator, returning its parameters followed by the
    /// verified margins in the layout of [`WasmLoopDesigner::margins`].
    ///
    /// # Arguments
    /// * `compensator` - `type1`, `type2` or `type3`
    /// * `crossover_hz` - Target crossover frequency
    /// * `phase_margin_deg` - Target phase margin (ignored by type 1)
    #[wasm_bindgen]
    pub fn design(
        &self,
        compensator: &str,
        crossover_hz: f64,
        phase_margin_deg: f64,
    ) -> Result<Vec<f64>, JsValue> {
        let kind = CompensatorType::from_keyword(compensator).ok_or_else(|| {
            JsValue::from_str(&format!("unknown compensator type '{compensator}'"))
        })?;
        let designer =
            CompensatorDesigner::with_config(self.schematic.plant(), self.schematic.search)
                .map_err(to_js)?;
        let compensator = designer
            .design(kind, crossover_hz, phase_margin_deg)
            .map_err(to_js)?
            .compensator();
        let margins = designer
            .verify_design(compensator.kind(), compensator.params())
            .map_err(to_js)?;

        let mut out = compensator.params().to_vec();
        out.extend(flatten_margins(&margins));
        Ok(out)
    }

    /// Natural frequency of the plant in Hz.
    #[wasm_bindgen(getter)]
    pub fn natural_frequency(&self) -> Option<f64> {
        self.schematic.plant().natural_frequency_hz()
    }

    /// Quality factor of the plant.
    #[wasm_bindgen(getter)]
    pub fn quality_factor(&self) -> Option<f64> {
        self.schematic.plant().quality_factor()
    }
}

fn flatten_points(points: &[FrequencyPoint]) -> Vec<f64> {
    points
        .iter()
        .flat_map(|p| [p.frequency_hz, p.gain_db, p.phase_deg])
        .collect()
}

fn flatten_margins(margins: &StabilityMargins) -> Vec<f64> {
    vec![
        margins.crossover_hz(),
        margins.phase_margin_deg,
        margins.phase_crossover_hz(),
        margins.gain_margin_db,
        margins.signed_phase_margin_deg,
    ]
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
