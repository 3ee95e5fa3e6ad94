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

//! Literal byte-pattern search over the inspected memory.

use crate::memory::{maybe_hex, Address, MemoryBuffer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Token is not a decimal or `0x` hexadecimal integer.
    InvalidToken { position: usize, token: String },
    /// Token parsed but does not fit in a byte.
    OutOfRange { position: usize, token: String },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidToken { position, token } => write!(
                fmt,
                "Pattern byte #{} `{}` is not a decimal or hexadecimal number.",
                position + 1,
                token
            ),
            Self::OutOfRange { position, token } => write!(
                fmt,
                "Pattern byte #{} `{}` does not fit in a byte (0-255).",
                position + 1,
                token
            ),
        }
    }
}

impl std::error::Error for PatternError {}

/// Returns every offset in `buffer` where `pattern` starts, in ascending order.
///
/// An empty pattern, or one longer than the buffer, finds nothing.
///
/// ```rust
/// use nucleoscope::search::search;
///
/// assert_eq!(search(&[0x10, 0xff, 0x00, 0xff, 0xa5], &[0xff, 0x00]), vec![1]);
/// assert!(search(&[0x10, 0xff], &[]).is_empty());
/// ```
pub fn search(buffer: &[u8], pattern: &[u8]) -> Vec<usize> {
    if pattern.is_empty() || pattern.len() > buffer.len() {
        return vec![];
    }
    buffer
        .windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

/// Parses whitespace or comma separated byte values.
///
/// Each token is either a `0x`-prefixed hexadecimal or a decimal number in
/// `0..=255`.
pub fn parse_pattern(text: &str) -> Result<Vec<u8>, PatternError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(position, token)| {
            let value = maybe_hex(token).map_err(|_| PatternError::InvalidToken {
                position,
                token: token.to_string(),
            })?;
            u8::try_from(value).map_err(|_| PatternError::OutOfRange {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// A parsed pattern ready to be run against memory buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSearch {
    pattern: Vec<u8>,
}

impl PatternSearch {
    pub fn new(pattern: Vec<u8>) -> Self {
        Self { pattern }
    }

    pub fn parse(text: &str) -> Result<Self, PatternError> {
        parse_pattern(text).map(Self::new)
    }

    #[inline]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Offsets of each match inside `buffer`.
    pub fn offsets(&self, buffer: &MemoryBuffer) -> Vec<usize> {
        search(buffer.as_bytes(), &self.pattern)
    }

    /// Guest addresses of each match inside `buffer`.
    pub fn addresses(&self, buffer: &MemoryBuffer) -> Vec<Address> {
        let base = buffer.base();
        self.offsets(buffer)
            .into_iter()
            .map(|offset| Address(base.0 + offset as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_overlapping_matches() {
        assert_eq!(search(&[0xaa; 5], &[0xaa, 0xaa]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_search_pattern_longer_than_buffer() {
        assert!(search(&[1, 2], &[1, 2, 3]).is_empty());
        assert!(search(&[], &[1]).is_empty());
    }

    #[test]
    fn test_search_whole_buffer() {
        assert_eq!(search(&[1, 2, 3], &[1, 2, 3]), vec![0]);
    }

    #[test]
    fn test_parse_pattern_mixed_radix() {
        assert_eq!(
            parse_pattern("0xFF 0 10, 0XA5"),
            Ok(vec![0xff, 0x00, 10, 0xa5])
        );
        assert_eq!(parse_pattern("   "), Ok(vec![]));
    }

    #[test]
    fn test_parse_pattern_errors() {
        assert_eq!(
            parse_pattern("0xff zz"),
            Err(PatternError::InvalidToken {
                position: 1,
                token: "zz".to_string()
            })
        );
        assert_eq!(
            parse_pattern("256"),
            Err(PatternError::OutOfRange {
                position: 0,
                token: "256".to_string()
            })
        );
        assert!(matches!(
            parse_pattern("-1"),
            Err(PatternError::InvalidToken { .. })
        ));
        assert_eq!(
            parse_pattern("+5 0x+a"),
            Err(PatternError::InvalidToken {
                position: 0,
                token: "+5".to_string()
            })
        );
        assert_eq!(
            parse_pattern("5 0x+a"),
            Err(PatternError::InvalidToken {
                position: 1,
                token: "0x+a".to_string()
            })
        );
    }

    #[test]
    fn test_addresses_are_rebased() {
        let buffer = MemoryBuffer::new(Address(0x2000_0000), vec![0, 0xca, 0xfe, 0xca, 0xfe])
            .unwrap();
        let search = PatternSearch::parse("0xca 0xfe").unwrap();
        assert_eq!(
            search.addresses(&buffer),
            vec![Address(0x2000_0001), Address(0x2000_0003)]
        );
    }
}
