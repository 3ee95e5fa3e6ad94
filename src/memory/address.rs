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

use std::num::ParseIntError;

use serde_derive::{Deserialize, Serialize};

/// A 32-bit guest address.
#[derive(Copy, Clone, Ord, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Address(pub u32);

impl Address {
    /// Returns `self + offset`, or `None` if it does not fit in 32 bits.
    #[inline]
    pub fn checked_add(self, offset: u32) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }

    /// Distance in bytes from `base` to `self`, if `self` is not below `base`.
    #[inline]
    pub fn offset_from(self, base: Self) -> Option<u32> {
        self.0.checked_sub(base.0)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "0x{:08x}", self.0)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "0x{:08x}", self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        maybe_hex(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNumberError {
    /// Digits start with `+` or `-`.
    Signed,
    Invalid(ParseIntError),
}

impl std::fmt::Display for ParseNumberError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Signed => write!(fmt, "number must not carry a sign"),
            Self::Invalid(err) => write!(fmt, "{}", err),
        }
    }
}

impl std::error::Error for ParseNumberError {}

/// Parses a `0x`/`0X` prefixed hexadecimal or a plain decimal number.
///
/// ```rust
/// use nucleoscope::memory::{maybe_hex, ParseNumberError};
///
/// assert_eq!(maybe_hex("0x20000000"), Ok(0x2000_0000));
/// assert_eq!(maybe_hex("255"), Ok(255));
/// assert!(maybe_hex("0xZZ").is_err());
/// assert_eq!(maybe_hex("0x+a"), Err(ParseNumberError::Signed));
/// ```
pub fn maybe_hex(s: &str) -> Result<u32, ParseNumberError> {
    const HEX_PREFIX: &str = "0x";
    const HEX_PREFIX_UPPER: &str = "0X";
    const HEX_PREFIX_LEN: usize = HEX_PREFIX.len();

    let (digits, radix) = if s.starts_with(HEX_PREFIX) || s.starts_with(HEX_PREFIX_UPPER) {
        (&s[HEX_PREFIX_LEN..], 16)
    } else {
        (s, 10)
    };
    // `from_str_radix` accepts a leading sign.
    if digits.starts_with(['+', '-']) {
        return Err(ParseNumberError::Signed);
    }
    u32::from_str_radix(digits, radix).map_err(ParseNumberError::Invalid)
}
