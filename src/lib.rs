//! # Powerloop Core
//!
//! Frequency-domain loop analysis for switching power converters.
//!
//! This library provides:
//! - A small description language for the converter's output filter
//! - Transfer function, Bode sweep and stability margins of the R-L-C plant
//! - Type 1/2/3 compensator synthesis from crossover and phase-margin targets
//! - Verification of a design on the compensated open loop
//!
//! ## Architecture
//!
//! - [`dsl`] - Parser for plant description files (`.plc`)
//! - [`components`] - Component records and reactive impedances
//! - [`circuit`] - Plant selection and validation
//! - [`analysis`] - Transfer function, sweeps and margin searches
//! - [`compensator`] - Compensator evaluation, design and verification
//! - [`report`] - Text and JSON output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! powerloop buck.plc margins
//! powerloop buck.plc design --type type2 --crossover 10k --phase-margin 45 --json
//! ```
//!
//! ### Library
//!
//! ```
//! use powerloop_core::{CompensatorDesigner, Plant, PlantAnalyzer};
//!
//! let plant = Plant::new(1.0, 1e-3, 1e-6);
//! let margins = PlantAnalyzer::new(plant).margins().unwrap();
//! assert!(margins.crossover_hz() > 5_000.0);
//!
//! let design = CompensatorDesigner::new(plant).design_type2(10_000.0, 45.0).unwrap();
//! assert!(design.kp > 0.0);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmLoopDesigner } from 'powerloop_core';
//!
//! const designer = new WasmLoopDesigner(plantDsl);
//! const margins = designer.margins();
//! ```

pub mod analysis;
pub mod circuit;
pub mod compensator;
pub mod components;
pub mod dsl;
pub mod error;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use analysis::{
    FrequencyPoint, FrequencyResponse, PlantAnalyzer, SearchConfig, StabilityMargins,
};
pub use circuit::{Plant, Schematic};
pub use compensator::{Compensator, CompensatorDesigner, CompensatorType, Design};
pub use error::{PowerloopError, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLoopDesigner;

/// Lower bound of the default margin search bracket (Hz)
pub const DEFAULT_SEARCH_START_HZ: f64 = 1.0;

/// Upper bound of the default margin search bracket (Hz)
pub const DEFAULT_SEARCH_END_HZ: f64 = 1.0e6;
