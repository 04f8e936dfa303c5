//! A parsed schematic: components plus analysis settings.

use crate::analysis::SearchConfig;
use crate::components::{Component, ComponentKind};
use crate::dsl::{DesignDef, PlantAst, SweepDef};
use crate::error::Result;

use super::Plant;

/// Everything a plant description file says.
#[derive(Debug, Clone)]
pub struct Schematic {
    /// All components, in file order
    pub components: Vec<Component>,
    /// Margin search settings (`.bounds`, `.iterations`)
    pub search: SearchConfig,
    /// Default sweep (`.sweep`)
    pub sweep: Option<SweepDef>,
    /// Default design target (`.design`)
    pub design: Option<DesignDef>,
}

impl Schematic {
    /// Build a schematic from a parsed description.
    pub fn from_ast(ast: PlantAst) -> Result<Self> {
        let components = ast
            .components
            .iter()
            .map(Component::from_def)
            .collect::<Result<Vec<_>>>()?;

        let mut search = SearchConfig::default();
        if let Some(bounds) = ast.bounds {
            search = search.with_bounds(bounds.start_hz, bounds.end_hz);
        }
        if let Some(iterations) = ast.iterations {
            search = search.with_max_iterations(iterations);
        }
        search.validate()?;

        Ok(Self {
            components,
            search,
            sweep: ast.sweep,
            design: ast.design,
        })
    }

    /// A schematic with default analysis settings.
    pub fn from_components(components: Vec<Component>) -> Self {
        Self {
            components,
            search: SearchConfig::default(),
            sweep: None,
            design: None,
        }
    }

    /// First component of the given kind.
    pub fn first_of(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind == kind)
    }

    /// Find a component by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The plant formed by the first R, L and C.
    pub fn plant(&self) -> Plant {
        Plant::from_components(&self.components)
    }
}
