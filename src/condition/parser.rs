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

//! Precedence climbing parser for breakpoint conditions.

use super::{
    lexer::{Token, TokenKind},
    BinaryOp, ConditionError, Expr, UnaryOp,
};

/// Nesting limit for parentheses and unary operators.
pub const MAX_DEPTH: usize = 64;

/// Limit on binary operators in one condition. Each one adds a level to the
/// tree that evaluation recurses through.
pub const MAX_OPERATORS: usize = 256;

pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    operators: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            operators: 0,
        }
    }

    /// Parses the whole token stream as one expression.
    pub fn parse(mut self) -> Result<Expr, ConditionError> {
        if self.tokens.is_empty() {
            return Err(ConditionError::Empty);
        }
        let expr = self.expression(0)?;
        if let Some(token) = self.peek() {
            return Err(ConditionError::UnexpectedToken {
                offset: token.offset,
                found: token.kind.to_string(),
                expected: "an operator or end of condition",
            });
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn enter(&mut self, offset: usize) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ConditionError::TooDeep { offset });
        }
        Ok(())
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Expr, ConditionError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(|t| binary_op(&t.kind)) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.operators += 1;
            if self.operators > MAX_OPERATORS {
                return Err(ConditionError::TooDeep {
                    offset: self.tokens[self.pos].offset,
                });
            }
            self.pos += 1;
            // All binary operators are left associative.
            let rhs = self.expression(precedence + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ConditionError> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.primary(),
        };
        let offset = self.tokens[self.pos].offset;
        self.pos += 1;
        self.enter(offset)?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Expr, ConditionError> {
        const EXPECTED: &str = "`value`, a number or `(`";

        let Some(token) = self.next() else {
            return Err(ConditionError::UnexpectedEnd { expected: EXPECTED });
        };
        match token.kind {
            TokenKind::Value => Ok(Expr::Value),
            TokenKind::Number(n) => Ok(Expr::Literal(n)),
            TokenKind::LParen => {
                self.enter(token.offset)?;
                let inner = self.expression(0)?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ConditionError::UnexpectedToken {
                        offset: other.offset,
                        found: other.kind.to_string(),
                        expected: "`)`",
                    }),
                    None => Err(ConditionError::UnexpectedEnd { expected: "`)`" }),
                }
            }
            ref other => Err(ConditionError::UnexpectedToken {
                offset: token.offset,
                found: other.to_string(),
                expected: EXPECTED,
            }),
        }
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        _ => return None,
    })
}
