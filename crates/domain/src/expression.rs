// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Restricted arithmetic over the two formula variables `A` and `B`.
//!
//! Indicator formulas such as `(A/B)*100` are parsed by a small
//! recursive-descent parser. The accepted language is:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | 'A' | 'B' | '(' expr ')'
//! ```
//!
//! Anything else (other identifiers, function calls, assignment, exponent
//! operators) is rejected with a [`FormulaSyntaxError`]. Division by zero
//! evaluates to `0`, and a non-finite result collapses to `0`.

use thiserror::Error;

/// The formula used when an indicator does not configure one.
pub const DEFAULT_PERCENTAGE_FORMULA: &str = "(A/B)*100";

/// Maximum nesting depth of parentheses and unary operators.
const MAX_DEPTH: usize = 64;

/// Reasons a formula string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaSyntaxError {
    /// The formula contains no tokens.
    #[error("formula is empty")]
    Empty,
    /// A character outside the accepted alphabet was found.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },
    /// An identifier other than `A` or `B` was found.
    #[error("unknown identifier '{name}' at position {position}; only A and B are allowed")]
    UnknownIdentifier { name: String, position: usize },
    /// A numeric literal could not be parsed.
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },
    /// A token appeared where it is not allowed.
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },
    /// The formula ended while an operand was still expected.
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// An opening parenthesis was never closed.
    #[error("missing ')' for '(' at position {position}")]
    UnclosedParenthesis { position: usize },
    /// The formula nests deeper than the evaluator allows.
    #[error("formula nesting exceeds 64 levels")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    VarA,
    VarB,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::VarA => String::from("A"),
            Self::VarB => String::from("B"),
            Self::Plus => String::from("+"),
            Self::Minus => String::from("-"),
            Self::Star => String::from("*"),
            Self::Slash => String::from("/"),
            Self::LParen => String::from("("),
            Self::RParen => String::from(")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(f64),
    VarA,
    VarB,
    Negate(Box<Node>),
    Binary {
        op: Operator,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
}

impl Node {
    fn evaluate(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Literal(value) => *value,
            Self::VarA => a,
            Self::VarB => b,
            Self::Negate(inner) => -inner.evaluate(a, b),
            Self::Binary { op, lhs, rhs } => {
                let left: f64 = lhs.evaluate(a, b);
                let right: f64 = rhs.evaluate(a, b);
                match op {
                    Operator::Add => left + right,
                    Operator::Subtract => left - right,
                    Operator::Multiply => left * right,
                    Operator::Divide => {
                        if right == 0.0 {
                            0.0
                        } else {
                            left / right
                        }
                    }
                }
            }
        }
    }
}

/// A parsed, reusable formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
}

impl Expression {
    /// Parses a formula string.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaSyntaxError`] if the formula uses anything outside
    /// `+ - * / ( )`, numeric literals, `A` and `B`, or is malformed.
    pub fn parse(formula: &str) -> Result<Self, FormulaSyntaxError> {
        let tokens: Vec<(Token, usize)> = tokenize(formula)?;
        if tokens.is_empty() {
            return Err(FormulaSyntaxError::Empty);
        }

        let mut parser: Parser = Parser {
            tokens: &tokens,
            cursor: 0,
            depth: 0,
        };
        let root: Node = parser.expression()?;

        if let Some((token, position)) = parser.peek() {
            return Err(FormulaSyntaxError::UnexpectedToken {
                found: token.describe(),
                position,
            });
        }

        Ok(Self { root })
    }

    /// Evaluates the formula with `A = a` and `B = b`.
    ///
    /// Never returns `NaN` or an infinity; such results become `0`.
    #[must_use]
    pub fn evaluate(&self, a: f64, b: f64) -> f64 {
        let value: f64 = self.root.evaluate(a, b);
        if value.is_finite() { value } else { 0.0 }
    }
}

/// Parses and evaluates `formula` with `A = a` and `B = b`.
///
/// # Errors
///
/// Returns a [`FormulaSyntaxError`] if the formula is rejected by the parser.
pub fn evaluate(formula: &str, a: f64, b: f64) -> Result<f64, FormulaSyntaxError> {
    Ok(Expression::parse(formula)?.evaluate(a, b))
}

/// Checks that a formula is accepted without evaluating it.
///
/// # Errors
///
/// Returns a [`FormulaSyntaxError`] if the formula is rejected by the parser.
pub fn validate_formula(formula: &str) -> Result<(), FormulaSyntaxError> {
    Expression::parse(formula).map(|_| ())
}

/// Evaluates a formula for reporting, treating any syntax error as `0`.
#[must_use]
pub fn calculate_mathematical_formula(a: f64, b: f64, formula: &str) -> f64 {
    evaluate(formula, a, b).unwrap_or(0.0)
}

fn tokenize(formula: &str) -> Result<Vec<(Token, usize)>, FormulaSyntaxError> {
    let chars: Vec<char> = formula.chars().collect();
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    let mut idx: usize = 0;

    while idx < chars.len() {
        let ch: char = chars[idx];
        let position: usize = idx;

        if ch.is_whitespace() {
            idx += 1;
            continue;
        }

        let single: Option<Token> = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push((token, position));
            idx += 1;
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let start: usize = idx;
            while idx < chars.len() && (chars[idx].is_ascii_digit() || chars[idx] == '.') {
                idx += 1;
            }
            let literal: String = chars[start..idx].iter().collect();
            let value: f64 =
                literal
                    .parse::<f64>()
                    .map_err(|_| FormulaSyntaxError::InvalidNumber {
                        literal: literal.clone(),
                        position: start,
                    })?;
            tokens.push((Token::Number(value), start));
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let start: usize = idx;
            while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_') {
                idx += 1;
            }
            let name: String = chars[start..idx].iter().collect();
            match name.as_str() {
                "A" => tokens.push((Token::VarA, start)),
                "B" => tokens.push((Token::VarB, start)),
                _ => {
                    return Err(FormulaSyntaxError::UnknownIdentifier {
                        name,
                        position: start,
                    });
                }
            }
            continue;
        }

        return Err(FormulaSyntaxError::UnexpectedCharacter {
            found: ch,
            position,
        });
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    cursor: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(Token, usize)> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next: Option<(Token, usize)> = self.peek();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn descend(&mut self) -> Result<(), FormulaSyntaxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaSyntaxError::TooDeep);
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Node, FormulaSyntaxError> {
        let mut node: Node = self.term()?;
        while let Some((token, _)) = self.peek() {
            let op: Operator = match token {
                Token::Plus => Operator::Add,
                Token::Minus => Operator::Subtract,
                _ => break,
            };
            self.cursor += 1;
            let rhs: Node = self.term()?;
            node = Node::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Node, FormulaSyntaxError> {
        let mut node: Node = self.unary()?;
        while let Some((token, _)) = self.peek() {
            let op: Operator = match token {
                Token::Star => Operator::Multiply,
                Token::Slash => Operator::Divide,
                _ => break,
            };
            self.cursor += 1;
            let rhs: Node = self.unary()?;
            node = Node::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Node, FormulaSyntaxError> {
        match self.peek() {
            Some((Token::Minus, _)) => {
                self.cursor += 1;
                self.descend()?;
                let inner: Node = self.unary()?;
                self.depth -= 1;
                Ok(Node::Negate(Box::new(inner)))
            }
            Some((Token::Plus, _)) => {
                self.cursor += 1;
                self.descend()?;
                let inner: Node = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Node, FormulaSyntaxError> {
        let Some((token, position)) = self.advance() else {
            return Err(FormulaSyntaxError::UnexpectedEnd);
        };

        match token {
            Token::Number(value) => Ok(Node::Literal(value)),
            Token::VarA => Ok(Node::VarA),
            Token::VarB => Ok(Node::VarB),
            Token::LParen => {
                self.descend()?;
                let inner: Node = self.expression()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, other_position)) => Err(FormulaSyntaxError::UnexpectedToken {
                        found: other.describe(),
                        position: other_position,
                    }),
                    None => Err(FormulaSyntaxError::UnclosedParenthesis { position }),
                }
            }
            other => Err(FormulaSyntaxError::UnexpectedToken {
                found: other.describe(),
                position,
            }),
        }
    }
}
