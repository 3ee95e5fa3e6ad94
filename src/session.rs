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

//! An inspector session: the buffer on screen, its breakpoints and the
//! access history, driven one access at a time.

use crate::{
    access::{AccessEvent, AccessKind, AccessLog},
    breakpoint::{BreakpointError, BreakpointId, BreakpointSet, BreakpointSpec, ConditionFault},
    memory::{Address, FillPattern, MemoryBuffer, MemoryError},
    search::{PatternError, PatternSearch},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Memory(MemoryError),
    Pattern(PatternError),
    Breakpoint(BreakpointError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Memory(err) => write!(fmt, "{}", err),
            Self::Pattern(err) => write!(fmt, "{}", err),
            Self::Breakpoint(err) => write!(fmt, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Memory(err) => Some(err),
            Self::Pattern(err) => Some(err),
            Self::Breakpoint(err) => Some(err),
        }
    }
}

impl From<MemoryError> for SessionError {
    fn from(err: MemoryError) -> Self {
        Self::Memory(err)
    }
}

impl From<PatternError> for SessionError {
    fn from(err: PatternError) -> Self {
        Self::Pattern(err)
    }
}

impl From<BreakpointError> for SessionError {
    fn from(err: BreakpointError) -> Self {
        Self::Breakpoint(err)
    }
}

/// What happened to a single access handed to [`InspectorSession::record_access`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The session is stopped; the access was dropped.
    Ignored,
    /// Logged, no breakpoint hit.
    Logged { faults: Vec<ConditionFault> },
    /// A breakpoint was hit and the session stopped.
    Hit {
        id: BreakpointId,
        hit_count: u64,
        faults: Vec<ConditionFault>,
    },
}

impl AccessOutcome {
    pub fn faults(&self) -> &[ConditionFault] {
        match self {
            Self::Ignored => &[],
            Self::Logged { faults } | Self::Hit { faults, .. } => faults,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InspectorSession {
    buffer: MemoryBuffer,
    breakpoints: BreakpointSet,
    log: AccessLog,
    running: bool,
}

impl InspectorSession {
    pub fn new(buffer: MemoryBuffer) -> Self {
        Self::with_log_capacity(buffer, AccessLog::DEFAULT_CAPACITY)
    }

    pub fn with_log_capacity(buffer: MemoryBuffer, capacity: usize) -> Self {
        Self {
            buffer,
            breakpoints: BreakpointSet::new(),
            log: AccessLog::with_capacity(capacity),
            running: false,
        }
    }

    #[inline]
    pub fn buffer(&self) -> &MemoryBuffer {
        &self.buffer
    }

    #[inline]
    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    #[inline]
    pub fn log(&self) -> &AccessLog {
        &self.log
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            log::info!("Inspector session started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Inspector session stopped");
        }
        self.running = false;
    }

    /// Replaces the buffer contents with freshly read memory.
    pub fn refresh(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        self.buffer.refresh(bytes)?;
        Ok(())
    }

    /// Replaces the buffer contents with `pattern`, for when no board is
    /// attached.
    pub fn refill(&mut self, pattern: FillPattern) {
        self.buffer.fill(pattern);
    }

    pub fn add_breakpoint(&mut self, spec: BreakpointSpec) -> Result<BreakpointId, SessionError> {
        Ok(self.breakpoints.add(spec)?)
    }

    pub fn remove_breakpoint(&mut self, id: BreakpointId) -> Result<(), SessionError> {
        self.breakpoints.remove(id)?;
        Ok(())
    }

    pub fn toggle_breakpoint(&mut self, id: BreakpointId) -> Result<bool, SessionError> {
        Ok(self.breakpoints.toggle(id)?)
    }

    /// Addresses inside the buffer where the byte pattern in `text` occurs.
    pub fn search(&self, text: &str) -> Result<Vec<Address>, SessionError> {
        let search = PatternSearch::parse(text)?;
        Ok(search.addresses(&self.buffer))
    }

    /// Handles one access while the session runs.
    ///
    /// Writes inside the buffer update it; accesses outside it are still
    /// logged and matched. On a breakpoint hit the hit count is incremented
    /// and the session stops.
    pub fn record_access(&mut self, event: AccessEvent) -> Result<AccessOutcome, SessionError> {
        if !self.running {
            return Ok(AccessOutcome::Ignored);
        }
        if event.kind == AccessKind::Write && self.buffer.contains(event.address) {
            self.buffer.write(event.address, event.value)?;
        }
        let result = self.breakpoints.find_match(&event);
        let hit = result.hit.map(|bp| bp.id);
        let faults = result.faults;
        self.log.push(event);
        let Some(id) = hit else {
            return Ok(AccessOutcome::Logged { faults });
        };
        let hit_count = self.breakpoints.record_hit(id)?;
        if let Some(event) = self.log.latest() {
            log::info!("Breakpoint {} hit ({} times) by {}", id, hit_count, event);
        }
        self.stop();
        Ok(AccessOutcome::Hit {
            id,
            hit_count,
            faults,
        })
    }
}
