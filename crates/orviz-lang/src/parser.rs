use orviz_solver::{ConstraintOp, Direction};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found '{found}' at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown operator '{op}' at position {span:?} (expected <=, >= or =)")]
    UnknownOperator { op: String, span: Span },
    #[error("Missing comparison operator (expected <=, >= or =)")]
    MissingOperator,
    #[error("Unknown variable '{name}' at position {span:?} (variables are named x1, x2, ...)")]
    UnknownVariable { name: String, span: Span },
    #[error("Objective must not contain a constant term")]
    ConstantInObjective,
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Constraint has no variables")]
    NoVariables,
}

/// Index of a variable token such as `x1` or `x12`. Indices start at 1.
pub fn variable_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('x')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|&k| k >= 1)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Set once any term without a variable has been read
    saw_constant: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            saw_constant: false,
        }
    }

    /// Parses a linear expression; a constant term is allowed.
    pub fn parse_expression(source: &str) -> Result<LinearExpr, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let expr = parser.parse_expr()?;
        parser.expect_eof()?;
        Ok(expr)
    }

    /// Parses an objective such as `3x1 + 2x2` or `min: x1 + x2`.
    pub fn parse_objective(source: &str) -> Result<ParsedObjective, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let direction = parser.parse_direction();
        let expr = parser.parse_expr()?;
        parser.expect_eof()?;
        // `x1 + 5 - 5` nets to zero but still has constant terms
        if parser.saw_constant || !expr.has_variables() {
            return Err(ParseError::ConstantInObjective);
        }
        Ok(ParsedObjective { direction, expr })
    }

    /// Parses `<expr> <op> <expr>` and moves variables left and constants right.
    pub fn parse_constraint(source: &str) -> Result<ParsedConstraint, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let lhs = parser.parse_expr()?;
        let op = parser.parse_relation()?;
        let rhs = parser.parse_expr()?;
        parser.expect_eof()?;

        let combined = lhs.minus(&rhs);
        if !combined.has_variables() {
            return Err(ParseError::NoVariables);
        }
        Ok(ParsedConstraint {
            rhs: 0.0 - combined.constant,
            expr: LinearExpr {
                terms: combined.terms,
                constant: 0.0,
            },
            op,
        })
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: t.text.clone(),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof(expected.to_string()),
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.peek_kind() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn parse_direction(&mut self) -> Direction {
        let direction = match self.current() {
            Some(t) if t.kind == TokenKind::Ident => match t.text.to_ascii_lowercase().as_str() {
                "max" | "maximize" => Some(Direction::Maximize),
                "min" | "minimize" => Some(Direction::Minimize),
                _ => None,
            },
            _ => None,
        };
        let Some(direction) = direction else {
            return Direction::Maximize;
        };
        self.advance();
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }
        direction
    }

    fn parse_relation(&mut self) -> Result<ConstraintOp, ParseError> {
        let Some(token) = self.current().cloned() else {
            return Err(ParseError::MissingOperator);
        };
        let op = match token.kind {
            TokenKind::Le => ConstraintOp::Le,
            TokenKind::Ge => ConstraintOp::Ge,
            TokenKind::Eq => ConstraintOp::Eq,
            TokenKind::Eof => return Err(ParseError::MissingOperator),
            TokenKind::Error if token.text.chars().all(|c| matches!(c, '<' | '>' | '=' | '!')) => {
                return Err(ParseError::UnknownOperator {
                    op: token.text,
                    span: token.span,
                });
            }
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        Ok(op)
    }

    fn parse_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let kind = self.peek_kind();
        if kind == TokenKind::Eof || kind.is_relation() {
            return Err(ParseError::EmptyExpression);
        }

        let mut expr = LinearExpr::new();
        let mut sign = match kind {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        };

        loop {
            self.parse_term(sign, &mut expr)?;
            sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
            // One negative sign may follow the separator, as in `3x1 + -2x2`
            if self.peek_kind() == TokenKind::Minus {
                self.advance();
                sign = -sign;
            }
        }

        Ok(expr)
    }

    fn parse_term(&mut self, sign: f64, expr: &mut LinearExpr) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let text = self.current().map(|t| t.text.clone()).unwrap_or_default();
                self.advance();
                let value: f64 = text.parse().map_err(|_| ParseError::InvalidNumber(text.clone()))?;

                let starred = self.peek_kind() == TokenKind::Star;
                if starred {
                    self.advance();
                }
                if self.peek_kind() == TokenKind::Ident {
                    let index = self.parse_variable()?;
                    expr.add_term(index, sign * value);
                } else if starred {
                    return Err(self.unexpected("variable"));
                } else {
                    self.saw_constant = true;
                    expr.add_constant(sign * value);
                }
            }
            TokenKind::Ident => {
                let index = self.parse_variable()?;
                expr.add_term(index, sign);
            }
            _ => return Err(self.unexpected("number or variable")),
        }
        Ok(())
    }

    fn parse_variable(&mut self) -> Result<usize, ParseError> {
        let Some(token) = self.current().cloned() else {
            return Err(ParseError::UnexpectedEof("variable".to_string()));
        };
        let index = variable_index(&token.text).ok_or(ParseError::UnknownVariable {
            name: token.text.clone(),
            span: token.span,
        })?;
        self.advance();
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn terms(pairs: &[(usize, f64)]) -> BTreeMap<usize, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_expression() {
        let expr = Parser::parse_expression("3x1 + 2x2").unwrap();
        assert_eq!(expr.terms, terms(&[(1, 3.0), (2, 2.0)]));
        assert_eq!(expr.constant, 0.0);
    }

    #[test]
    fn test_implicit_and_signed_coefficients() {
        let expr = Parser::parse_expression("-x1 - 2.5x2 + x3").unwrap();
        assert_eq!(expr.terms, terms(&[(1, -1.0), (2, -2.5), (3, 1.0)]));

        let starred = Parser::parse_expression("4 * x2").unwrap();
        assert_eq!(starred.terms, terms(&[(2, 4.0)]));
    }

    #[test]
    fn test_duplicate_variables_are_summed() {
        let expr = Parser::parse_expression("x1 + 2x1 - x2 + 0.5x2").unwrap();
        assert_eq!(expr.terms, terms(&[(1, 3.0), (2, -0.5)]));
    }

    #[test]
    fn test_parse_constraint() {
        let c = Parser::parse_constraint("x1 >= 0").unwrap();
        assert_eq!(c.expr.terms, terms(&[(1, 1.0)]));
        assert_eq!(c.op, ConstraintOp::Ge);
        assert_eq!(c.rhs, 0.0);

        let c = Parser::parse_constraint("2x1+x2<=8").unwrap();
        assert_eq!(c.expr.terms, terms(&[(1, 2.0), (2, 1.0)]));
        assert_eq!(c.op, ConstraintOp::Le);
        assert_eq!(c.rhs, 8.0);
    }

    #[test]
    fn test_constants_fold_into_rhs() {
        let c = Parser::parse_constraint("2x1 + 3 <= 10 - x2").unwrap();
        assert_eq!(c.expr.terms, terms(&[(1, 2.0), (2, 1.0)]));
        assert_eq!(c.expr.constant, 0.0);
        assert_eq!(c.rhs, 7.0);

        let c = Parser::parse_constraint("x1 + x2 = -4").unwrap();
        assert_eq!(c.op, ConstraintOp::Eq);
        assert_eq!(c.rhs, -4.0);
    }

    #[test]
    fn test_objective_direction() {
        let obj = Parser::parse_objective("3x1 + 2x2").unwrap();
        assert_eq!(obj.direction, Direction::Maximize);

        let obj = Parser::parse_objective("min: 2x1 + x2").unwrap();
        assert_eq!(obj.direction, Direction::Minimize);
        assert_eq!(obj.expr.terms, terms(&[(1, 2.0), (2, 1.0)]));

        let obj = Parser::parse_objective("Maximize x2").unwrap();
        assert_eq!(obj.direction, Direction::Maximize);
    }

    #[test]
    fn test_objective_rejects_constant() {
        assert_eq!(
            Parser::parse_objective("3x1 + 2x2 + 5"),
            Err(ParseError::ConstantInObjective)
        );
        assert_eq!(Parser::parse_objective("7"), Err(ParseError::ConstantInObjective));
        for source in ["x1 + 5 - 5", "3x1 + 2x2 + 0", "0", "min: 0"] {
            assert_eq!(
                Parser::parse_objective(source),
                Err(ParseError::ConstantInObjective),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_negative_coefficient_after_separator() {
        let expr = Parser::parse_expression("3x1 + -2x2").unwrap();
        assert_eq!(expr.terms, terms(&[(1, 3.0), (2, -2.0)]));

        let obj = Parser::parse_objective("3x1 + -2x2").unwrap();
        assert_eq!(obj.expr.terms, terms(&[(1, 3.0), (2, -2.0)]));

        let c = Parser::parse_constraint("x1 - -2x2 <= 4").unwrap();
        assert_eq!(c.expr.terms, terms(&[(1, 1.0), (2, 2.0)]));
        assert_eq!(c.rhs, 4.0);

        let c = Parser::parse_constraint("x1 <= 4 + -x2").unwrap();
        assert_eq!(c.expr.terms, terms(&[(1, 1.0), (2, 1.0)]));
        assert_eq!(c.rhs, 4.0);
    }

    #[test]
    fn test_repeated_signs_are_rejected() {
        assert!(matches!(
            Parser::parse_expression("3x1 + - -2x2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse_expression("3x1 - + 2x2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse_expression("3x1 + -"),
            Err(ParseError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_double_operator_is_rejected() {
        let err = Parser::parse_expression("3x1 ++ 2x2").unwrap_err();
        match err {
            ParseError::UnexpectedToken { found, span, .. } => {
                assert_eq!(found, "+");
                assert_eq!(span, Span::new(5, 6));
            }
            other => panic!("Expected unexpected token, got {:?}", other),
        }
        assert!(Parser::parse_constraint("3x1 ++ 2x2 <= 4").is_err());
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            Parser::parse_constraint("x1 <> 5"),
            Err(ParseError::UnknownOperator {
                op: "<>".to_string(),
                span: Span::new(3, 5),
            })
        );
        assert!(matches!(
            Parser::parse_constraint("x1 < 5"),
            Err(ParseError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_missing_and_extra_operators() {
        assert_eq!(Parser::parse_constraint("x1 + x2"), Err(ParseError::MissingOperator));
        assert!(matches!(
            Parser::parse_constraint("x1 <= 3 <= 4"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse_constraint("x1 5"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_unknown_variables() {
        for source in ["y + x1", "X1", "x0", "x1x2", "x"] {
            assert!(
                matches!(Parser::parse_expression(source), Err(ParseError::UnknownVariable { .. })),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_empty_and_dangling() {
        assert_eq!(Parser::parse_expression(""), Err(ParseError::EmptyExpression));
        assert_eq!(Parser::parse_constraint("<= 4"), Err(ParseError::EmptyExpression));
        assert_eq!(Parser::parse_constraint("x1 <="), Err(ParseError::EmptyExpression));
        assert_eq!(
            Parser::parse_expression("x1 +"),
            Err(ParseError::UnexpectedEof("number or variable".to_string()))
        );
        assert!(matches!(
            Parser::parse_expression("3 * 4"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_constraint_serializes() {
        let c = Parser::parse_constraint("2x1 + x2 <= 8").unwrap();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["op"], "Le");
        assert_eq!(value["rhs"], 8.0);
        assert_eq!(value["expr"]["terms"]["1"], 2.0);

        let back: ParsedConstraint = serde_json::from_value(value).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_constraint_without_variables() {
        assert_eq!(Parser::parse_constraint("5 <= 3"), Err(ParseError::NoVariables));
    }

    #[test]
    fn test_display() {
        let expr = Parser::parse_expression("-x1 + 2.5x2 - 3").unwrap();
        assert_eq!(expr.to_string(), "-x1 + 2.5x2 - 3");

        let c = Parser::parse_constraint("2x1 + 3 <= 10 - x2").unwrap();
        assert_eq!(c.to_string(), "2x1 + x2 <= 7");
        assert_eq!(Parser::parse_constraint(&c.to_string()).unwrap(), c);
    }

    proptest! {
        #[test]
        fn prop_display_reparses_to_same_mapping(
            raw in prop::collection::vec((1usize..6, -800i32..800), 1..6),
            constant in -800i32..800,
        ) {
            let mut expr = LinearExpr::new();
            for (k, c) in &raw {
                expr.add_term(*k, *c as f64 / 8.0);
            }
            expr.add_constant(constant as f64 / 8.0);

            let reparsed = Parser::parse_expression(&expr.to_string()).unwrap();
            prop_assert_eq!(reparsed, expr);
        }
    }
}
