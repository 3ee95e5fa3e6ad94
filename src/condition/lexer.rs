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

use super::ConditionError;
use crate::memory::maybe_hex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Value,
    Number(i64),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::Value => "value",
            Self::Number(n) => return write!(fmt, "{}", n),
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Bang => "!",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::EqEq => "==",
            Self::Ne => "!=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        };
        write!(fmt, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset into the condition text.
    pub offset: usize,
}

pub fn tokenize(text: &str) -> Result<Vec<Token>, ConditionError> {
    let bytes = text.as_bytes();
    let mut tokens = vec![];
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let offset = i;
        let peek = bytes.get(i + 1).copied();
        let (kind, len) = match (c, peek) {
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'!', Some(b'=')) => (TokenKind::Ne, 2),
            (b'!', _) => (TokenKind::Bang, 1),
            (b'&', Some(b'&')) => (TokenKind::AndAnd, 2),
            (b'|', Some(b'|')) => (TokenKind::OrOr, 2),
            (c, _) if c.is_ascii_digit() => {
                let len = word_len(&bytes[i..]);
                let literal = &text[i..i + len];
                let value = maybe_hex(literal).map_err(|_| ConditionError::InvalidNumber {
                    offset,
                    literal: literal.to_string(),
                })?;
                (TokenKind::Number(value.into()), len)
            }
            (c, _) if c.is_ascii_alphabetic() || c == b'_' => {
                let len = word_len(&bytes[i..]);
                let kind = match &text[i..i + len] {
                    "value" => TokenKind::Value,
                    "true" => TokenKind::Number(1),
                    "false" => TokenKind::Number(0),
                    other => {
                        return Err(ConditionError::UnknownIdentifier {
                            offset,
                            name: other.to_string(),
                        })
                    }
                };
                (kind, len)
            }
            _ => {
                // Multi-byte characters are reported whole.
                let found = text[i..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(ConditionError::UnexpectedCharacter { offset, found });
            }
        };
        tokens.push(Token { kind, offset });
        i += len;
    }
    Ok(tokens)
}

fn word_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("value>=0x10&&value!=20||!(value<=3)"),
            vec![
                TokenKind::Value,
                TokenKind::Ge,
                TokenKind::Number(0x10),
                TokenKind::AndAnd,
                TokenKind::Value,
                TokenKind::Ne,
                TokenKind::Number(20),
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::LParen,
                TokenKind::Value,
                TokenKind::Le,
                TokenKind::Number(3),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_offsets() {
        let tokens = tokenize("  value == 1").unwrap();
        assert_eq!(tokens[0].offset, 2);
        assert_eq!(tokens[1].offset, 8);
        assert_eq!(tokens[2].offset, 11);
    }

    #[test]
    fn test_tokenize_rejects_host_syntax() {
        assert_eq!(
            tokenize("value = 1"),
            Err(ConditionError::UnexpectedCharacter {
                offset: 6,
                found: '='
            })
        );
        assert_eq!(
            tokenize("alert(1)"),
            Err(ConditionError::UnknownIdentifier {
                offset: 0,
                name: "alert".to_string()
            })
        );
        assert_eq!(
            tokenize("value & 1"),
            Err(ConditionError::UnexpectedCharacter {
                offset: 6,
                found: '&'
            })
        );
        assert_eq!(
            tokenize("0x1g"),
            Err(ConditionError::InvalidNumber {
                offset: 0,
                literal: "0x1g".to_string()
            })
        );
    }
}
