//! Error types for the Powerloop analysis core.
//!
//! This module provides a unified error type [`PowerloopError`] covering plant
//! description parsing, plant validation, frequency-range checks and
//! compensator parameter checks.
//!
//! Numeric edge cases (a zero-magnitude phasor, a zero frequency, a singular
//! closed loop) are *not* errors. They come back as `-inf` or NaN so that a
//! frequency sweep always produces every point.

use thiserror::Error;

use crate::compensator::CompensatorType;
use crate::components::ComponentKind;

/// Result type alias using [`PowerloopError`].
pub type Result<T> = std::result::Result<T, PowerloopError>;

/// Unified error type for all Powerloop operations.
#[derive(Error, Debug)]
pub enum PowerloopError {
    // ============ Description File Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    // ============ Plant Errors ============
    /// The plant lacks one of the three elements of the R-L-C network
    #[error("Plant has no {kind}; the transfer function is identically zero")]
    MissingPlantElement { kind: ComponentKind },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ Analysis Errors ============
    /// Non-positive frequency, inverted bounds or an empty iteration
    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    /// Compensator parameter list length disagrees with its type
    #[error("{compensator} compensator expects {expected} parameter(s), got {got}")]
    ArityMismatch {
        compensator: CompensatorType,
        expected: usize,
        got: usize,
    },

    /// Bisection exhausted its budget and the caller asked for a hard failure
    #[error(
        "{search} search did not converge after {iterations} iterations \
         (best estimate {frequency_hz:.3} Hz)"
    )]
    NonConvergence {
        search: &'static str,
        iterations: usize,
        frequency_hz: f64,
    },

    // ============ I/O Errors ============
    /// Error reading a plant description file
    #[error("Failed to read plant file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Report output error: {message}")]
    OutputError { message: String },
}

impl PowerloopError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(
        name: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid range error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }
}
