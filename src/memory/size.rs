// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the nucleoscope project.

//! Utility struct for watched range sizes.

use std::num::NonZero;

use serde_derive::{Deserialize, Serialize};

#[derive(Copy, Eq, PartialEq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
/// A non-zero size in bytes.
pub struct WatchSize(pub NonZero<u32>);

impl WatchSize {
    // SAFETY: value is non-zero.
    /// A single byte.
    pub const BYTE: Self = Self(NonZero::new(1).unwrap());

    #[inline]
    /// Constructs a new size, returning `None` for zero.
    pub const fn new(value: u32) -> Option<Self> {
        match NonZero::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Unwraps the value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for WatchSize {
    fn default() -> Self {
        Self::BYTE
    }
}

impl std::fmt::Display for WatchSize {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.get() {
            1 => write!(fmt, "1 byte"),
            n => write!(fmt, "{} bytes", n),
        }
    }
}

impl std::fmt::Debug for WatchSize {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.get())
    }
}
