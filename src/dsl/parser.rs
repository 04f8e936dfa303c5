//! Parser for plant description files.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::compensator::CompensatorType;
use crate::components::ComponentKind;
use crate::error::{PowerloopError, Result};

/// Phase margin used when a `.design` line omits it.
pub const DEFAULT_PHASE_MARGIN_DEG: f64 = 45.0;

/// Parser for plant descriptions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire description.
    pub fn parse(&mut self) -> Result<PlantAst> {
        let mut ast = PlantAst::new();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {}
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    ast.components.push(component);
                }
                TokenKind::Number => {
                    return Err(PowerloopError::parse(
                        self.current.line,
                        format!("unexpected number '{}'", self.current.text),
                    ));
                }
            }

            if !self.at_line_end() {
                return Err(PowerloopError::parse(
                    self.current.line,
                    format!("unexpected trailing token '{}'", self.current.text),
                ));
            }
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn expect_number(&mut self, what: &str) -> Result<f64> {
        if self.current.kind != TokenKind::Number {
            return Err(PowerloopError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            ));
        }
        let value = parse_value(&self.current.text).ok_or_else(|| {
            PowerloopError::parse(
                self.current.line,
                format!("invalid number: {}", self.current.text),
            )
        })?;
        self.advance()?;
        Ok(value)
    }

    fn expect_count(&mut self, what: &str) -> Result<usize> {
        let line = self.current.line;
        let value = self.expect_number(what)?;
        if value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
            return Err(PowerloopError::parse(
                line,
                format!("{} must be a non-negative integer, got {}", what, value),
            ));
        }
        Ok(value as usize)
    }

    fn parse_directive(&mut self, ast: &mut PlantAst) -> Result<()> {
        let directive = self.current.text.to_lowercase();
        let line = self.current.line;
        self.advance()?;

        match directive.as_str() {
            ".bounds" => {
                let start_hz = self.expect_number("start frequency")?;
                let end_hz = self.expect_number("end frequency")?;
                ast.bounds = Some(BoundsDef {
                    start_hz,
                    end_hz,
                    line,
                });
            }
            ".iterations" => {
                ast.iterations = Some(self.expect_count("iteration count")?);
            }
            ".sweep" => {
                let start_hz = self.expect_number("start frequency")?;
                let end_hz = self.expect_number("end frequency")?;
                let points = self.expect_count("point count")?;
                ast.sweep = Some(SweepDef {
                    start_hz,
                    end_hz,
                    points,
                    line,
                });
            }
            ".design" => {
                ast.design = Some(self.parse_design(line)?);
            }
            _ => {
                return Err(PowerloopError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_design(&mut self, line: usize) -> Result<DesignDef> {
        if self.at_line_end() {
            return Err(PowerloopError::parse(line, "expected compensator type"));
        }
        let keyword = self.current.text.clone();
        let compensator = CompensatorType::from_keyword(&keyword).ok_or_else(|| {
            PowerloopError::parse(line, format!("unknown compensator type: {}", keyword))
        })?;
        self.advance()?;

        let crossover_hz = self.expect_number("crossover frequency")?;
        let phase_margin_deg = if self.at_line_end() {
            DEFAULT_PHASE_MARGIN_DEG
        } else {
            self.expect_number("phase margin")?
        };

        Ok(DesignDef {
            compensator,
            crossover_hz,
            phase_margin_deg,
            line,
        })
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let kind = ComponentKind::from_name(&name).ok_or_else(|| {
            PowerloopError::UnknownComponentType {
                component_type: name.clone(),
                line,
            }
        })?;

        let value = if self.current.kind == TokenKind::Number {
            let text = self.current.text.clone();
            let v = parse_value(&text).ok_or_else(|| {
                PowerloopError::invalid_component(&name, line, format!("invalid value '{}'", text))
            })?;
            self.advance()?;
            Some(v)
        } else {
            None
        };

        let unit = if self.current.kind == TokenKind::Identifier {
            let label = self.current.text.clone();
            self.advance()?;
            Some(label)
        } else {
            None
        };

        Ok(ComponentDef {
            kind,
            name,
            value,
            unit,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Result<PlantAst> {
        super::super::parse(input)
    }

    #[test]
    fn test_parse_components_in_order() {
        let ast = parse("R1 1\nL1 1m H\nC1 1uF\nVIN 12 V\n").unwrap();
        assert_eq!(ast.components.len(), 4);
        assert_eq!(ast.components[0].kind, ComponentKind::Resistor);
        assert_eq!(ast.components[1].name, "L1");
        assert_relative_eq!(ast.components[1].value.unwrap(), 1e-3);
        assert_eq!(ast.components[1].unit.as_deref(), Some("H"));
        assert_relative_eq!(ast.components[2].value.unwrap(), 1e-6);
        assert_eq!(ast.components[2].unit.as_deref(), Some("F"));
        assert_eq!(ast.components[3].kind, ComponentKind::VoltageSource);
        assert_eq!(ast.components[3].line, 4);
    }

    #[test]
    fn test_parse_directives() {
        let input = ".bounds 10 100k\n.iterations 60\n.sweep 10 1M 50\n.design type3 20k 50\n";
        let ast = parse(input).unwrap();
        let bounds = ast.bounds.unwrap();
        assert_eq!(bounds.start_hz, 10.0);
        assert_eq!(bounds.end_hz, 100e3);
        assert_eq!(ast.iterations, Some(60));
        assert_eq!(ast.sweep.unwrap().points, 50);
        let design = ast.design.unwrap();
        assert_eq!(design.compensator, CompensatorType::Type3);
        assert_eq!(design.crossover_hz, 20e3);
        assert_eq!(design.phase_margin_deg, 50.0);
    }

    #[test]
    fn test_design_phase_margin_defaults() {
        let ast = parse(".design type2 10k").unwrap();
        assert_eq!(ast.design.unwrap().phase_margin_deg, DEFAULT_PHASE_MARGIN_DEG);
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# Buck output filter\nR1 1 ; load\n\n; nothing here\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.components.len(), 1);
    }

    #[test]
    fn test_unknown_component_prefix() {
        let err = parse("R1 1\nX1 5").unwrap_err();
        assert!(matches!(err, PowerloopError::UnknownComponentType { line: 2, .. }));
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse(".tran 1u 1m").unwrap_err();
        assert!(matches!(err, PowerloopError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("R1 1 Ohm extra").unwrap_err();
        assert!(matches!(err, PowerloopError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_fractional_point_count_rejected() {
        assert!(parse(".sweep 10 1M 2.5").is_err());
    }
}
