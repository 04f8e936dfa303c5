//! Plant construction and validation.
//!
//! A [`Schematic`] holds every component from a description file. The
//! analysis core never searches it directly: the caller selects the
//! [`Plant`] once (first resistor, first inductor, first capacitor) and hands
//! that to the analyzer.

mod plant;
mod schematic;
mod validate;

pub use plant::Plant;
pub use schematic::Schematic;
pub use validate::{validate_plant, validate_schematic};
