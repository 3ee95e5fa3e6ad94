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

//! Memory breakpoints and the matcher deciding which one an access hits.

mod set;

pub use set::*;
use serde::{de, Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};

use crate::{
    access::{AccessEvent, AccessKind},
    condition::{Condition, ConditionError, EvalError},
    memory::{maybe_hex, Address, WatchSize},
};

bitflags::bitflags! {
    /// Which accesses a breakpoint watches.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct AccessType: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const BOTH = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl AccessType {
    /// Whether an access of `kind` is watched.
    #[inline]
    pub fn watches(self, kind: AccessKind) -> bool {
        self.contains(kind.into())
    }

    pub const fn as_str(&self) -> &'static str {
        match self.bits() {
            0b01 => "read",
            0b10 => "write",
            0b11 => "both",
            _ => "none",
        }
    }
}

impl From<AccessKind> for AccessType {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Read => Self::READ,
            AccessKind::Write => Self::WRITE,
        }
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" | "r" => Ok(Self::READ),
            "write" | "w" => Ok(Self::WRITE),
            "both" | "rw" | "read_write" => Ok(Self::BOTH),
            other => Err(format!(
                "Unknown access type `{other}`, expected one of read, write, both"
            )),
        }
    }
}

impl serde::Serialize for AccessType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for AccessType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakpointId(pub u32);

impl std::fmt::Display for BreakpointId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "#{}", self.0)
    }
}

/// A breakpoint definition as supplied by the user, before validation.
///
/// Addresses may be given as numbers or as decimal/`0x` hexadecimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointSpec {
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "address_from_json")]
    pub address: Address,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_access")]
    pub access: AccessType,
    #[serde(default)]
    pub condition: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_size() -> u32 {
    1
}

fn default_access() -> AccessType {
    AccessType::BOTH
}

fn default_enabled() -> bool {
    true
}

fn address_from_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u32),
        Text(String),
    }

    match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::Number(n) => Ok(Address(n)),
        Repr::Text(s) => maybe_hex(s.trim())
            .map(Address)
            .map_err(|err| de::Error::custom(format!("invalid address `{s}`: {err}"))),
    }
}

impl BreakpointSpec {
    pub fn new(address: Address, size: u32, access: AccessType) -> Self {
        Self {
            name: String::new(),
            address,
            size,
            access,
            condition: String::new(),
            enabled: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointError {
    ZeroSize,
    Overflows {
        address: Address,
        size: u32,
    },
    NoAccessType,
    Condition {
        condition: String,
        error: ConditionError,
    },
    UnknownId(BreakpointId),
}

impl std::fmt::Display for BreakpointError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ZeroSize => write!(fmt, "Breakpoint size must be at least one byte."),
            Self::Overflows { address, size } => write!(
                fmt,
                "Breakpoint at {} of {} bytes runs past the end of the 32-bit address space.",
                address, size
            ),
            Self::NoAccessType => write!(fmt, "Breakpoint watches neither reads nor writes."),
            Self::Condition { condition, error } => {
                write!(fmt, "Invalid condition `{}`: {}", condition, error)
            }
            Self::UnknownId(id) => write!(fmt, "No breakpoint with id {}.", id),
        }
    }
}

impl std::error::Error for BreakpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Condition { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A validated memory breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub id: BreakpointId,
    pub name: String,
    pub address: Address,
    pub size: WatchSize,
    pub access: AccessType,
    pub condition: Option<Condition>,
    pub enabled: bool,
    pub hit_count: u64,
}

impl Breakpoint {
    /// Validates `spec`. Invalid definitions are rejected whole.
    pub fn new(id: BreakpointId, spec: BreakpointSpec) -> Result<Self, BreakpointError> {
        let BreakpointSpec {
            name,
            address,
            size,
            access,
            condition,
            enabled,
        } = spec;
        let size = WatchSize::new(size).ok_or(BreakpointError::ZeroSize)?;
        // The last watched byte must be addressable.
        if address.checked_add(size.get() - 1).is_none() {
            return Err(BreakpointError::Overflows {
                address,
                size: size.get(),
            });
        }
        if access.is_empty() {
            return Err(BreakpointError::NoAccessType);
        }
        let condition = Condition::compile_optional(&condition).map_err(|error| {
            BreakpointError::Condition {
                condition: condition.clone(),
                error,
            }
        })?;
        Ok(Self {
            id,
            name,
            address,
            size,
            access,
            condition,
            enabled,
            hit_count: 0,
        })
    }

    /// Whether `address` lies in `[self.address, self.address + self.size)`.
    #[inline]
    pub fn covers(&self, address: Address) -> bool {
        address
            .offset_from(self.address)
            .is_some_and(|offset| offset < self.size.get())
    }

    /// Converts back into an editable definition.
    pub fn to_spec(&self) -> BreakpointSpec {
        BreakpointSpec {
            name: self.name.clone(),
            address: self.address,
            size: self.size.get(),
            access: self.access,
            condition: self
                .condition
                .as_ref()
                .map(|c| c.source().to_string())
                .unwrap_or_default(),
            enabled: self.enabled,
        }
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.id)?;
        if !self.name.is_empty() {
            write!(fmt, " \"{}\"", self.name)?;
        }
        write!(fmt, " {} {} at {}", self.access, self.size, self.address)?;
        if let Some(condition) = &self.condition {
            write!(fmt, " if {}", condition)?;
        }
        if !self.enabled {
            write!(fmt, " (disabled)")?;
        }
        Ok(())
    }
}

/// A condition that could not be evaluated for an access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFault {
    pub id: BreakpointId,
    pub condition: String,
    pub error: EvalError,
}

impl std::fmt::Display for ConditionFault {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "condition `{}` of breakpoint {} failed: {}",
            self.condition, self.id, self.error
        )
    }
}

/// Returned when no breakpoint matched and at least one condition could not
/// be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEvaluationError {
    pub faults: Vec<ConditionFault>,
}

impl std::fmt::Display for ConditionEvaluationError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut faults = self.faults.iter();
        if let Some(first) = faults.next() {
            write!(fmt, "{}", first)?;
        }
        for fault in faults {
            write!(fmt, "; {}", fault)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConditionEvaluationError {}

/// Outcome of [`match_breakpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub hit: Option<&'a Breakpoint>,
    /// Conditions that failed while looking for `hit`, in list order.
    pub faults: Vec<ConditionFault>,
}

impl<'a> MatchResult<'a> {
    /// `Err` only when nothing matched and a condition failed along the way.
    pub fn into_result(self) -> Result<Option<&'a Breakpoint>, ConditionEvaluationError> {
        match self.hit {
            None if !self.faults.is_empty() => Err(ConditionEvaluationError {
                faults: self.faults,
            }),
            hit => Ok(hit),
        }
    }
}

/// Finds the first enabled breakpoint, in iteration order, hit by `event`.
///
/// A breakpoint is hit when it covers the event address, watches the event's
/// kind of access and has no condition or one that holds for the event value.
/// A condition that fails to evaluate counts as not holding; the failure is
/// recorded in [`MatchResult::faults`] and the search goes on.
///
/// ```rust
/// use nucleoscope::{access::AccessEvent, breakpoint::*, memory::Address};
///
/// let bp = Breakpoint::new(
///     BreakpointId(1),
///     BreakpointSpec::new(Address(0x2000_0000), 4, AccessType::WRITE).with_condition("value > 10"),
/// )
/// .unwrap();
/// let breakpoints = [bp];
/// let hit = |event| match_breakpoint(&event, &breakpoints).hit.map(|bp| bp.id);
///
/// assert_eq!(hit(AccessEvent::write(Address(0x2000_0002), 20)), Some(BreakpointId(1)));
/// assert_eq!(hit(AccessEvent::write(Address(0x2000_0002), 5)), None);
/// assert_eq!(hit(AccessEvent::read(Address(0x2000_0002), 20)), None);
/// ```
pub fn match_breakpoint<'a, I>(event: &AccessEvent, breakpoints: I) -> MatchResult<'a>
where
    I: IntoIterator<Item = &'a Breakpoint>,
{
    let mut faults = vec![];
    for bp in breakpoints {
        if !bp.enabled || !bp.covers(event.address) || !bp.access.watches(event.kind) {
            continue;
        }
        let Some(condition) = &bp.condition else {
            log::debug!("{} hit by {}", bp, event);
            return MatchResult {
                hit: Some(bp),
                faults,
            };
        };
        match condition.evaluate(event.value) {
            Ok(true) => {
                log::debug!("{} hit by {}", bp, event);
                return MatchResult {
                    hit: Some(bp),
                    faults,
                };
            }
            Ok(false) => {}
            Err(error) => {
                let fault = ConditionFault {
                    id: bp.id,
                    condition: condition.source().to_string(),
                    error,
                };
                log::warn!("{} for {}", fault, event);
                faults.push(fault);
            }
        }
    }
    MatchResult { hit: None, faults }
}
