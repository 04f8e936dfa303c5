//! Parser for plant description files.
//!
//! A plant description is a SPICE-flavoured, line-oriented list of
//! schematic components plus a few directives that configure the analysis.
//!
//! # Grammar Overview
//!
//! ```text
//! file        = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument }
//! component   = name [value] [unit_label]
//!
//! directive_name = "bounds" | "iterations" | "sweep" | "design"
//! name        = prefix identifier_tail
//! prefix      = "R" | "C" | "L" | "V" | "I" | "D" | "M" | "Q" | "OP" | "U"
//! value       = number [scale_suffix]
//! unit_label  = identifier
//!
//! number      = ['-'|'+'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! scale_suffix = 'p' | 'n' | 'u' | 'µ' | 'm' | 'k' | 'K' | 'M' | 'G'
//! ```
//!
//! A value and its unit label may be written together: `1uF` lexes as the
//! number `1u` followed by the label `F`.
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .bounds | Margin search bounds | `.bounds <start> <end>` |
//! | .iterations | Bisection budget | `.iterations <n>` |
//! | .sweep | Default Bode sweep | `.sweep <start> <end> <points>` |
//! | .design | Default design target | `.design <type1\|type2\|type3> <crossover> [phase_margin]` |
//!
//! # Example
//!
//! ```text
//! # Buck converter output filter
//! VIN  12   V
//! R1   1    Ohm
//! L1   1m   H
//! C1   1u   F
//!
//! .sweep  10 1M 50
//! .design type2 10k 45
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::{Parser, DEFAULT_PHASE_MARGIN_DEG};

use crate::error::Result;

/// Parse a plant description string.
pub fn parse(input: &str) -> Result<PlantAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a plant description file.
pub fn parse_file(path: &std::path::Path) -> Result<PlantAst> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::PowerloopError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
