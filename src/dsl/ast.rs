//! Syntax tree for plant description files.

use crate::compensator::CompensatorType;
use crate::components::ComponentKind;

/// Complete representation of a parsed plant description.
#[derive(Debug, Clone, Default)]
pub struct PlantAst {
    /// Component lines, in file order
    pub components: Vec<ComponentDef>,
    /// `.bounds` directive
    pub bounds: Option<BoundsDef>,
    /// `.iterations` directive
    pub iterations: Option<usize>,
    /// `.sweep` directive
    pub sweep: Option<SweepDef>,
    /// `.design` directive
    pub design: Option<DesignDef>,
}

impl PlantAst {
    /// Create a new empty description.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component line.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Kind inferred from the name prefix
    pub kind: ComponentKind,
    /// Component name as written
    pub name: String,
    /// Value after applying the unit suffix
    pub value: Option<f64>,
    /// Trailing unit label (e.g. `H`, `F`, `Ohm`)
    pub unit: Option<String>,
    /// Source line number for error reporting
    pub line: usize,
}

/// `.bounds <start> <end>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsDef {
    pub start_hz: f64,
    pub end_hz: f64,
    pub line: usize,
}

/// `.sweep <start> <end> <points>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepDef {
    pub start_hz: f64,
    pub end_hz: f64,
    pub points: usize,
    pub line: usize,
}

/// `.design <type> <crossover> [phase_margin]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignDef {
    pub compensator: CompensatorType,
    pub crossover_hz: f64,
    pub phase_margin_deg: f64,
    pub line: usize,
}
