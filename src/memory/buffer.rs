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

use std::fmt::Write;

use crate::memory::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    OutOfRange {
        address: Address,
        base: Address,
        len: usize,
    },
    LengthMismatch {
        expected: usize,
        got: usize,
    },
    TooLarge {
        base: Address,
        len: usize,
    },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::OutOfRange { address, base, len } => write!(
                fmt,
                "Address {} is outside of the inspected range starting at {} of {} bytes.",
                address, base, len
            ),
            Self::LengthMismatch { expected, got } => write!(
                fmt,
                "Refreshed memory has {} bytes but the buffer holds {} bytes.",
                got, expected
            ),
            Self::TooLarge { base, len } => write!(
                fmt,
                "A buffer of {} bytes starting at {} does not fit in the 32-bit address space.",
                len, base
            ),
        }
    }
}

impl std::error::Error for MemoryError {}

/// Byte patterns used to synthesize buffer contents when no device is
/// attached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum FillPattern {
    Zeroes,
    Ones,
    Incrementing,
    /// Repeats the little-endian bytes of `0xDEADBEEF`.
    DeadBeef,
}

impl FillPattern {
    fn byte_at(self, index: usize) -> u8 {
        match self {
            Self::Zeroes => 0x00,
            Self::Ones => 0xff,
            Self::Incrementing => index as u8,
            Self::DeadBeef => 0xdead_beef_u32.to_le_bytes()[index % 4],
        }
    }
}

/// The bytes currently displayed by the inspector.
///
/// The length is fixed at construction; [`MemoryBuffer::refresh`] replaces the
/// contents wholesale and refuses data of a different length.
///
/// ```rust
/// use nucleoscope::memory::{Address, MemoryBuffer};
///
/// let mut buffer = MemoryBuffer::new(Address(0x2000_0000), vec![0; 16]).unwrap();
/// buffer.write(Address(0x2000_0004), 0xa5).unwrap();
/// assert_eq!(buffer.read(Address(0x2000_0004)), Ok(0xa5));
/// assert!(buffer.read(Address(0x2000_0010)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryBuffer {
    base: Address,
    bytes: Vec<u8>,
}

impl MemoryBuffer {
    pub fn new(base: Address, bytes: Vec<u8>) -> Result<Self, MemoryError> {
        if (base.0 as u64) + (bytes.len() as u64) > (u32::MAX as u64) + 1 {
            return Err(MemoryError::TooLarge {
                base,
                len: bytes.len(),
            });
        }
        Ok(Self { base, bytes })
    }

    pub fn filled(base: Address, len: usize, pattern: FillPattern) -> Result<Self, MemoryError> {
        let mut buffer = Self::new(base, vec![0; len])?;
        buffer.fill(pattern);
        Ok(buffer)
    }

    #[inline]
    pub const fn base(&self) -> Address {
        self.base
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether `address` falls inside the buffer.
    pub fn contains(&self, address: Address) -> bool {
        self.index_of(address).is_some()
    }

    fn index_of(&self, address: Address) -> Option<usize> {
        let offset = address.offset_from(self.base)? as usize;
        (offset < self.bytes.len()).then_some(offset)
    }

    fn out_of_range(&self, address: Address) -> MemoryError {
        MemoryError::OutOfRange {
            address,
            base: self.base,
            len: self.bytes.len(),
        }
    }

    pub fn read(&self, address: Address) -> Result<u8, MemoryError> {
        self.index_of(address)
            .map(|i| self.bytes[i])
            .ok_or_else(|| self.out_of_range(address))
    }

    pub fn write(&mut self, address: Address, value: u8) -> Result<(), MemoryError> {
        let Some(i) = self.index_of(address) else {
            return Err(self.out_of_range(address));
        };
        self.bytes[i] = value;
        Ok(())
    }

    /// Replace the contents wholesale with freshly read memory.
    pub fn refresh(&mut self, bytes: Vec<u8>) -> Result<(), MemoryError> {
        if bytes.len() != self.bytes.len() {
            return Err(MemoryError::LengthMismatch {
                expected: self.bytes.len(),
                got: bytes.len(),
            });
        }
        self.bytes = bytes;
        Ok(())
    }

    /// Refill the contents with `pattern`.
    pub fn fill(&mut self, pattern: FillPattern) {
        for (i, b) in self.bytes.iter_mut().enumerate() {
            *b = pattern.byte_at(i);
        }
    }

    /// Renders `len` bytes starting at `start` as rows of sixteen bytes, each
    /// followed by its printable ASCII column.
    ///
    /// The requested range is clamped to the buffer.
    pub fn hexdump(&self, start: Address, len: usize) -> Result<String, MemoryError> {
        let first = self.index_of(start).ok_or_else(|| self.out_of_range(start))?;
        let last = first.saturating_add(len).min(self.bytes.len());
        let mut out = String::new();
        for (row, chunk) in self.bytes[first..last].chunks(16).enumerate() {
            let address = self.base.0 + (first + row * 16) as u32;
            let _ = write!(out, "{}:", Address(address));
            for i in 0..16 {
                match chunk.get(i) {
                    Some(b) => {
                        let _ = write!(out, " {:02x}", b);
                    }
                    None => out.push_str("   "),
                }
            }
            out.push_str("  |");
            out.extend(chunk.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            }));
            out.push_str("|\n");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_keeps_length() {
        let mut buffer = MemoryBuffer::new(Address(0x100), vec![1, 2, 3]).unwrap();
        assert_eq!(
            buffer.refresh(vec![0; 4]),
            Err(MemoryError::LengthMismatch {
                expected: 3,
                got: 4
            })
        );
        assert_eq!(buffer.as_bytes(), &[1, 2, 3]);
        buffer.refresh(vec![7, 8, 9]).unwrap();
        assert_eq!(buffer.as_bytes(), &[7, 8, 9]);
    }

    #[test]
    fn test_below_base_is_out_of_range() {
        let buffer = MemoryBuffer::new(Address(0x100), vec![0; 4]).unwrap();
        assert!(buffer.read(Address(0xff)).is_err());
        assert!(buffer.read(Address(0x103)).is_ok());
        assert!(!buffer.contains(Address(0x104)));
    }

    #[test]
    fn test_buffer_must_fit_address_space() {
        assert!(MemoryBuffer::new(Address(u32::MAX), vec![0; 1]).is_ok());
        assert_eq!(
            MemoryBuffer::new(Address(u32::MAX), vec![0; 2]),
            Err(MemoryError::TooLarge {
                base: Address(u32::MAX),
                len: 2
            })
        );
    }

    #[test]
    fn test_fill_patterns() {
        let buffer = MemoryBuffer::filled(Address(0), 6, FillPattern::DeadBeef).unwrap();
        assert_eq!(buffer.as_bytes(), &[0xef, 0xbe, 0xad, 0xde, 0xef, 0xbe]);
        let mut buffer = MemoryBuffer::filled(Address(0), 300, FillPattern::Incrementing).unwrap();
        assert_eq!(buffer.as_bytes()[257], 1);
        buffer.fill(FillPattern::Ones);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0xff));
        assert_eq!(buffer.len(), 300);
    }

    #[test]
    fn test_hexdump() {
        let buffer = MemoryBuffer::new(Address(0x0800_0000), b"Hello, Nucleo!\x00\x01AB".to_vec())
            .unwrap();
        let dump = buffer.hexdump(Address(0x0800_0000), 64).unwrap();
        let lines = dump.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x08000000: 48 65 6c 6c 6f 2c 20 4e 75 63 6c 65 6f 21 00 01  |Hello, Nucleo!..|"
        );
        assert!(lines[1].starts_with("0x08000010: 41 42   "));
        assert!(lines[1].ends_with("|AB|"));
    }
}
