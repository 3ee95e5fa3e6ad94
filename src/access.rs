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

//! Memory access notifications and their bounded history.

use std::{collections::VecDeque, time::SystemTime};

use serde_derive::{Deserialize, Serialize};

use crate::memory::Address;

/// Kind of a single memory access.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Read => write!(fmt, "read"),
            Self::Write => write!(fmt, "write"),
        }
    }
}

/// A single byte read from or written to guest memory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub address: Address,
    pub value: u8,
    pub kind: AccessKind,
    /// Who performed the access, e.g. `"CPU"` or `"DMA1"`.
    pub source: String,
}

impl AccessEvent {
    /// Creates an event stamped with the current time.
    pub fn new(address: Address, value: u8, kind: AccessKind, source: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        Self {
            timestamp,
            address,
            value,
            kind,
            source: source.into(),
        }
    }

    pub fn read(address: Address, value: u8) -> Self {
        Self::new(address, value, AccessKind::Read, "CPU")
    }

    pub fn write(address: Address, value: u8) -> Self {
        Self::new(address, value, AccessKind::Write, "CPU")
    }
}

impl std::fmt::Display for AccessEvent {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "{} {} 0x{:02x} at {}",
            self.source, self.kind, self.value, self.address
        )
    }
}

/// Most recent accesses, oldest first.
///
/// Once `capacity` events are held, each new event evicts the oldest one.
#[derive(Clone, Debug)]
pub struct AccessLog {
    events: VecDeque<AccessEvent>,
    capacity: usize,
}

impl AccessLog {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: AccessEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest(&self) -> Option<&AccessEvent> {
        self.events.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AccessEvent> {
        self.events.iter()
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_evicts_oldest() {
        let mut log = AccessLog::with_capacity(3);
        for i in 0..5u8 {
            log.push(AccessEvent::write(Address(0x2000_0000 + u32::from(i)), i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(
            log.iter().map(|e| e.value).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        assert_eq!(log.latest().map(|e| e.value), Some(4));
    }

    #[test]
    fn test_zero_capacity() {
        let mut log = AccessLog::with_capacity(0);
        log.push(AccessEvent::read(Address(0), 1));
        log.push(AccessEvent::read(Address(0), 2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.latest().map(|e| e.value), Some(2));
    }

    #[test]
    fn test_event_display() {
        let mut event = AccessEvent::new(Address(0x4001_3800), 0x41, AccessKind::Write, "DMA1");
        event.timestamp = 0;
        assert_eq!(event.to_string(), "DMA1 write 0x41 at 0x40013800");
        assert_eq!(
            serde_json::to_value(&event).unwrap()["kind"],
            serde_json::json!("write")
        );
    }
}
