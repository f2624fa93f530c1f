//! Expression sublanguage (`spec.md` §6, REDESIGN FLAGS): numbers, time-series
//! references `SERIES;COLUMN`, variable references `$var.NAME`, arithmetic
//! `+ - * /`, and comparators `< > ==` producing 0/1.
//!
//! Parsed into a tagged-node tree at model-load time instead of evaluated as
//! a runtime string, per the REDESIGN FLAGS note.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("expression parse error at position {pos}: {what}")]
    Parse { pos: usize, what: String },

    #[error("unknown time series column: {series};{column}")]
    UnknownSeries { series: String, column: String },

    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Number(f64),
    TimeSeries { series: String, column: String },
    Variable { name: String },
    Negate(Box<ExprNode>),
    Binary {
        op: BinOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
}

/// Supplies the numeric arrays and scalar variables an `ExprNode` reads at
/// evaluation time. `ec_driver` implements this over the loaded time-series
/// tables and model-level variable bindings.
pub trait ExprContext {
    fn time_series(&self, series: &str, column: &str, period: usize) -> Option<f64>;
    fn variable(&self, name: &str) -> Option<f64>;
}

pub fn parse(source: &str) -> Result<ExprNode, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_comparison()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::Parse {
            pos: parser.pos,
            what: "trailing tokens after expression".to_string(),
        });
    }
    Ok(node)
}

pub fn eval(node: &ExprNode, ctx: &dyn ExprContext, period: usize) -> Result<f64, ExprError> {
    match node {
        ExprNode::Number(value) => Ok(*value),
        ExprNode::TimeSeries { series, column } => {
            ctx.time_series(series, column, period)
                .ok_or_else(|| ExprError::UnknownSeries {
                    series: series.clone(),
                    column: column.clone(),
                })
        }
        ExprNode::Variable { name } => ctx
            .variable(name)
            .ok_or_else(|| ExprError::UnknownVariable { name: name.clone() }),
        ExprNode::Negate(inner) => Ok(-eval(inner, ctx, period)?),
        ExprNode::Binary { op, lhs, rhs } => {
            let a = eval(lhs, ctx, period)?;
            let b = eval(rhs, ctx, period)?;
            Ok(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
            })
        }
        ExprNode::Compare { op, lhs, rhs } => {
            let a = eval(lhs, ctx, period)?;
            let b = eval(rhs, ctx, period)?;
            let truthy = match op {
                CmpOp::Lt => a < b,
                CmpOp::Gt => a > b,
                CmpOp::Eq => (a - b).abs() < 1.0e-12,
            };
            Ok(if truthy { 1.0 } else { 0.0 })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    TimeSeries { series: String, column: String },
    Variable(String),
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Gt,
    EqEq,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '<' => {
                tokens.push(Token::Lt);
                i += 1;
            }
            '>' => {
                tokens.push(Token::Gt);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::EqEq);
                i += 2;
            }
            '$' => {
                let start = i;
                i += 1;
                let prefix: String = chars[i..].iter().take_while(|c| c.is_alphanumeric() || **c == '.').collect();
                if !prefix.starts_with("var.") {
                    return Err(ExprError::Parse {
                        pos: start,
                        what: "expected $var.NAME".to_string(),
                    });
                }
                let name = prefix["var.".len()..].to_string();
                if name.is_empty() {
                    return Err(ExprError::Parse {
                        pos: start,
                        what: "empty variable name".to_string(),
                    });
                }
                i += prefix.len();
                tokens.push(Token::Variable(name));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| ExprError::Parse {
                    pos: start,
                    what: format!("invalid number literal '{text}'"),
                })?;
                tokens.push(Token::Number(value));
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let first: String = chars[start..i].iter().collect();
                if i < chars.len() && chars[i] == ';' {
                    i += 1;
                    let col_start = i;
                    while i < chars.len() && is_ident_char(chars[i]) {
                        i += 1;
                    }
                    let column: String = chars[col_start..i].iter().collect();
                    if column.is_empty() {
                        return Err(ExprError::Parse {
                            pos: col_start,
                            what: "expected column name after ';'".to_string(),
                        });
                    }
                    tokens.push(Token::TimeSeries { series: first, column });
                } else {
                    return Err(ExprError::Parse {
                        pos: start,
                        what: format!("bare identifier '{first}' is not a valid reference (expected SERIES;COLUMN)"),
                    });
                }
            }
            other => {
                return Err(ExprError::Parse {
                    pos: i,
                    what: format!("unexpected character '{other}'"),
                });
            }
        }
    }
    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_comparison(&mut self) -> Result<ExprNode, ExprError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::EqEq) => Some(CmpOp::Eq),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let rhs = self.parse_additive()?;
                Ok(ExprNode::Compare {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
            None => Ok(lhs),
        }
    }

    fn parse_additive(&mut self) -> Result<ExprNode, ExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = ExprNode::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprNode, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = ExprNode::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprNode, ExprError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(ExprNode::Negate(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ExprNode, ExprError> {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(ExprNode::Number(value))
            }
            Some(Token::TimeSeries { series, column }) => {
                self.pos += 1;
                Ok(ExprNode::TimeSeries { series, column })
            }
            Some(Token::Variable(name)) => {
                self.pos += 1;
                Ok(ExprNode::Variable { name })
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_comparison()?;
                match self.tokens.get(self.pos) {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(ExprError::Parse {
                        pos: self.pos,
                        what: "expected ')'".to_string(),
                    }),
                }
            }
            other => Err(ExprError::Parse {
                pos: self.pos,
                what: format!("unexpected token {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapContext {
        series: HashMap<(String, String), Vec<f64>>,
        variables: HashMap<String, f64>,
    }

    impl ExprContext for MapContext {
        fn time_series(&self, series: &str, column: &str, period: usize) -> Option<f64> {
            self.series
                .get(&(series.to_string(), column.to_string()))
                .and_then(|values| values.get(period))
                .copied()
        }

        fn variable(&self, name: &str) -> Option<f64> {
            self.variables.get(name).copied()
        }
    }

    fn context() -> MapContext {
        let mut series = HashMap::new();
        series.insert(("RATE".to_string(), "GAS".to_string()), vec![100.0, 200.0, 300.0]);
        let mut variables = HashMap::new();
        variables.insert("max_rate".to_string(), 250.0);
        MapContext { series, variables }
    }

    #[test]
    fn parses_and_evaluates_number() {
        let node = parse("42.5").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 42.5);
    }

    #[test]
    fn parses_and_evaluates_arithmetic_precedence() {
        let node = parse("2 + 3 * 4").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 14.0);
    }

    #[test]
    fn parses_time_series_reference() {
        let node = parse("RATE;GAS").unwrap();
        assert_eq!(eval(&node, &context(), 1).unwrap(), 200.0);
    }

    #[test]
    fn parses_variable_reference() {
        let node = parse("$var.max_rate").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 250.0);
    }

    #[test]
    fn comparator_produces_zero_or_one() {
        let node = parse("RATE;GAS < $var.max_rate").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 1.0);
        assert_eq!(eval(&node, &context(), 2).unwrap(), 0.0);
    }

    #[test]
    fn boolean_weighted_arithmetic_encodes_conditionality() {
        let node = parse("(RATE;GAS < $var.max_rate) * RATE;GAS").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 100.0);
        assert_eq!(eval(&node, &context(), 2).unwrap(), 0.0);
    }

    #[test]
    fn parenthesized_expressions_override_precedence() {
        let node = parse("(2 + 3) * 4").unwrap();
        assert_eq!(eval(&node, &context(), 0).unwrap(), 20.0);
    }

    #[test]
    fn unknown_series_is_an_error() {
        let node = parse("MISSING;COLUMN").unwrap();
        assert!(eval(&node, &context(), 0).is_err());
    }

    #[test]
    fn bare_identifier_without_series_separator_is_rejected() {
        assert!(parse("NOT_A_REFERENCE").is_err());
    }
}
