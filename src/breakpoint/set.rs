// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the nucleoscope project.

//! Ordered breakpoint collection owned by an inspector session.

use indexmap::IndexMap;

use super::{
    match_breakpoint, Breakpoint, BreakpointError, BreakpointId, BreakpointSpec, MatchResult,
};
use crate::access::AccessEvent;

/// Breakpoints in creation order.
///
/// Order matters: when several breakpoints match an access, the one created
/// first wins.
#[derive(Debug, Clone, Default)]
pub struct BreakpointSet {
    breakpoints: IndexMap<BreakpointId, Breakpoint>,
    next_id: u32,
}

impl BreakpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from definitions, failing on the first invalid one.
    pub fn from_specs<I>(specs: I) -> Result<Self, BreakpointError>
    where
        I: IntoIterator<Item = BreakpointSpec>,
    {
        let mut set = Self::new();
        for spec in specs {
            set.add(spec)?;
        }
        Ok(set)
    }

    /// Validates and appends a breakpoint, returning its id.
    ///
    /// Nothing is stored if validation fails.
    pub fn add(&mut self, spec: BreakpointSpec) -> Result<BreakpointId, BreakpointError> {
        let id = BreakpointId(self.next_id + 1);
        let bp = Breakpoint::new(id, spec)?;
        log::info!("Adding breakpoint {}", bp);
        self.next_id = id.0;
        self.breakpoints.insert(id, bp);
        Ok(id)
    }

    pub fn remove(&mut self, id: BreakpointId) -> Result<Breakpoint, BreakpointError> {
        // `shift_remove` keeps the relative order of the remaining entries.
        self.breakpoints
            .shift_remove(&id)
            .ok_or(BreakpointError::UnknownId(id))
    }

    /// Flips the enabled state, returning the new state.
    pub fn toggle(&mut self, id: BreakpointId) -> Result<bool, BreakpointError> {
        let bp = self.get_mut(id)?;
        bp.enabled = !bp.enabled;
        Ok(bp.enabled)
    }

    pub fn set_enabled(&mut self, id: BreakpointId, enabled: bool) -> Result<(), BreakpointError> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Increments the hit count, returning the new count.
    pub fn record_hit(&mut self, id: BreakpointId) -> Result<u64, BreakpointError> {
        let bp = self.get_mut(id)?;
        bp.hit_count = bp.hit_count.saturating_add(1);
        Ok(bp.hit_count)
    }

    pub fn clear_hits(&mut self) {
        for bp in self.breakpoints.values_mut() {
            bp.hit_count = 0;
        }
    }

    pub fn get(&self, id: BreakpointId) -> Option<&Breakpoint> {
        self.breakpoints.get(&id)
    }

    fn get_mut(&mut self, id: BreakpointId) -> Result<&mut Breakpoint, BreakpointError> {
        self.breakpoints
            .get_mut(&id)
            .ok_or(BreakpointError::UnknownId(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Runs [`match_breakpoint`] over the set.
    pub fn find_match(&self, event: &AccessEvent) -> MatchResult<'_> {
        match_breakpoint(event, self.breakpoints.values())
    }

    /// Editable definitions of all breakpoints, e.g. for saving to disk.
    pub fn to_specs(&self) -> Vec<BreakpointSpec> {
        self.iter().map(Breakpoint::to_spec).collect()
    }
}

impl<'a> IntoIterator for &'a BreakpointSet {
    type Item = &'a Breakpoint;
    type IntoIter = indexmap::map::Values<'a, BreakpointId, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.breakpoints.values()
    }
}
