//
// nucleoscope
//
// Copyright 2025- Manos Pitsidianakis
//
// This file is part of nucleoscope.
//
// nucleoscope is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// nucleoscope is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with nucleoscope. If not, see <http://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later

//! Breakpoint conditions.
//!
//! A condition is a small arithmetic/comparison expression over the single
//! variable `value`, the byte involved in a memory access. Conditions are
//! compiled once into an [`Expr`] tree and evaluated as data.
//!
//! Supported syntax, from highest to lowest precedence:
//!
//! | syntax                          | meaning                     |
//! |---------------------------------|-----------------------------|
//! | `value`, `42`, `0x2a`, `( .. )` | operands                    |
//! | `-x`, `!x`                      | negation, logical not       |
//! | `*`, `/`                        | multiplication, division    |
//! | `+`, `-`                        | addition, subtraction       |
//! | `<`, `<=`, `>`, `>=`            | comparison                  |
//! | `==`, `!=`                      | equality                    |
//! | `&&`                            | logical and (short-circuit) |
//! | `||`                            | logical or (short-circuit)  |
//!
//! Number literals are unsigned 32-bit, decimal or `0x` hexadecimal, the same
//! range as guest addresses. Arithmetic on them is carried out in `i64` and
//! overflow is an evaluation error. Conditions hold at most 256 binary
//! operators and nest at most 64 parentheses or unary operators deep.
//!
//! ```rust
//! use nucleoscope::condition::Condition;
//!
//! let condition = Condition::compile("value > 10 && value != 0x20").unwrap();
//! assert_eq!(condition.evaluate(20), Ok(true));
//! assert_eq!(condition.evaluate(0x20), Ok(false));
//! assert!(Condition::compile("value = 1").is_err());
//! ```

mod lexer;
mod parser;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    Empty,
    UnexpectedCharacter {
        offset: usize,
        found: char,
    },
    InvalidNumber {
        offset: usize,
        literal: String,
    },
    UnknownIdentifier {
        offset: usize,
        name: String,
    },
    UnexpectedToken {
        offset: usize,
        found: String,
        expected: &'static str,
    },
    UnexpectedEnd {
        expected: &'static str,
    },
    TooDeep {
        offset: usize,
    },
}

impl std::fmt::Display for ConditionError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Empty => write!(fmt, "Condition is empty."),
            Self::UnexpectedCharacter { offset, found } => {
                write!(fmt, "Unexpected character `{}` at column {}.", found, offset + 1)
            }
            Self::InvalidNumber { offset, literal } => {
                write!(fmt, "Invalid number `{}` at column {}.", literal, offset + 1)
            }
            Self::UnknownIdentifier { offset, name } => write!(
                fmt,
                "Unknown name `{}` at column {}; only `value` may be used.",
                name,
                offset + 1
            ),
            Self::UnexpectedToken {
                offset,
                found,
                expected,
            } => write!(
                fmt,
                "Expected {} at column {}, found `{}`.",
                expected,
                offset + 1,
                found
            ),
            Self::UnexpectedEnd { expected } => {
                write!(fmt, "Condition ends early, expected {}.", expected)
            }
            Self::TooDeep { offset } => write!(
                fmt,
                "Condition is too long or nests too deeply at column {}.",
                offset + 1
            ),
        }
    }
}

impl std::error::Error for ConditionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    DivisionByZero,
    Overflow,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(fmt, "division by zero"),
            Self::Overflow => write!(fmt, "arithmetic overflow"),
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Binding power; higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div => 6,
            Self::Add | Self::Sub => 5,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 4,
            Self::Eq | Self::Ne => 3,
            Self::And => 2,
            Self::Or => 1,
        }
    }
}

/// Compiled condition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Value,
    Literal(i64),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the tree with `value` bound to `value`.
    pub fn evaluate(&self, value: i64) -> Result<i64, EvalError> {
        Ok(match self {
            Self::Value => value,
            Self::Literal(n) => *n,
            Self::Unary(UnaryOp::Neg, operand) => operand
                .evaluate(value)?
                .checked_neg()
                .ok_or(EvalError::Overflow)?,
            Self::Unary(UnaryOp::Not, operand) => (operand.evaluate(value)? == 0).into(),
            Self::Binary(BinaryOp::And, lhs, rhs) => {
                (lhs.evaluate(value)? != 0 && rhs.evaluate(value)? != 0).into()
            }
            Self::Binary(BinaryOp::Or, lhs, rhs) => {
                (lhs.evaluate(value)? != 0 || rhs.evaluate(value)? != 0).into()
            }
            Self::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.evaluate(value)?, rhs.evaluate(value)?);
                match op {
                    BinaryOp::Mul => a.checked_mul(b).ok_or(EvalError::Overflow)?,
                    BinaryOp::Div if b == 0 => return Err(EvalError::DivisionByZero),
                    BinaryOp::Div => a.checked_div(b).ok_or(EvalError::Overflow)?,
                    BinaryOp::Add => a.checked_add(b).ok_or(EvalError::Overflow)?,
                    BinaryOp::Sub => a.checked_sub(b).ok_or(EvalError::Overflow)?,
                    BinaryOp::Lt => (a < b).into(),
                    BinaryOp::Le => (a <= b).into(),
                    BinaryOp::Gt => (a > b).into(),
                    BinaryOp::Ge => (a >= b).into(),
                    BinaryOp::Eq => (a == b).into(),
                    BinaryOp::Ne => (a != b).into(),
                    BinaryOp::And | BinaryOp::Or => unreachable!(),
                }
            }
        })
    }
}

/// A compiled breakpoint condition together with the text it came from.
#[derive(Debug, Clone)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    pub fn compile(text: &str) -> Result<Self, ConditionError> {
        let tokens = lexer::tokenize(text)?;
        let expr = parser::Parser::new(&tokens).parse()?;
        Ok(Self {
            source: text.trim().to_string(),
            expr,
        })
    }

    /// Compiles `text`, treating blank text as "no condition".
    pub fn compile_optional(text: &str) -> Result<Option<Self>, ConditionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        Self::compile(text).map(Some)
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the condition holds for an access of `value`.
    pub fn evaluate(&self, value: u8) -> Result<bool, EvalError> {
        self.expr.evaluate(value.into()).map(|v| v != 0)
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for Condition {}

impl std::fmt::Display for Condition {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.source)
    }
}

impl std::str::FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::compile(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str, value: u8) -> Result<bool, EvalError> {
        Condition::compile(text).unwrap().evaluate(value)
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("value > 10", 20), Ok(true));
        assert_eq!(eval("value > 10", 5), Ok(false));
        assert_eq!(eval("value >= 10", 10), Ok(true));
        assert_eq!(eval("value <= 0xff", 255), Ok(true));
        assert_eq!(eval("value == 0x2A", 42), Ok(true));
        assert_eq!(eval("value != 42", 42), Ok(false));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("value * 2 == 84", 42), Ok(true));
        assert_eq!(eval("value / 3 == 4", 14), Ok(true));
        assert_eq!(eval("(value + 1) * 2 == 6", 2), Ok(true));
        assert_eq!(eval("-value < 0", 1), Ok(true));
        assert_eq!(eval("value - 300 < 0", 255), Ok(true));
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(eval("value", 0), Ok(false));
        assert_eq!(eval("value", 7), Ok(true));
        assert_eq!(eval("!value", 0), Ok(true));
        assert_eq!(eval("true", 0), Ok(true));
        assert_eq!(eval("false || value == 1", 1), Ok(true));
    }

    #[test]
    fn test_short_circuit_skips_faults() {
        assert_eq!(eval("value == 0 || 1 / value > 0", 0), Ok(true));
        assert_eq!(eval("value != 0 && 1 / value > 0", 0), Ok(false));
    }

    #[test]
    fn test_runtime_errors() {
        assert_eq!(eval("10 / value > 1", 0), Err(EvalError::DivisionByZero));
        assert_eq!(
            eval("0xffffffff * 0xffffffff * 0xffffffff > 0", 0),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn test_long_operator_chain() {
        let chain = |terms: usize| format!("value{} > 0", " + 1".repeat(terms));
        assert!(matches!(
            Condition::compile(&chain(10_000)),
            Err(ConditionError::TooDeep { .. })
        ));
        let condition = Condition::compile(&chain(255)).unwrap();
        assert_eq!(condition.evaluate(1), Ok(true));
        assert_eq!(
            Condition::compile("value - 1 - 1 - 1 == 0")
                .unwrap()
                .evaluate(3),
            Ok(true)
        );
    }

    #[test]
    fn test_literal_range() {
        assert_eq!(eval("value < 0xffffffff", 0), Ok(true));
        assert_eq!(eval("value < 4294967295", 255), Ok(true));
        assert_eq!(
            Condition::compile("value < 4294967296"),
            Err(ConditionError::InvalidNumber {
                offset: 8,
                literal: "4294967296".to_string()
            })
        );
    }

    #[test]
    fn test_compile_optional() {
        assert_eq!(Condition::compile_optional("   "), Ok(None));
        assert!(Condition::compile_optional(" value > 1 ")
            .unwrap()
            .is_some_and(|c| c.source() == "value > 1"));
        assert!(Condition::compile_optional("value >").is_err());
    }

    #[test]
    fn test_serde() {
        let condition: Condition = serde_json::from_str("\"value > 10\"").unwrap();
        assert_eq!(serde_json::to_string(&condition).unwrap(), "\"value > 10\"");
        let err = serde_json::from_str::<Condition>("\"value >> 10\"").unwrap_err();
        assert!(err.to_string().contains("column 8"), "{}", err);
    }
}
