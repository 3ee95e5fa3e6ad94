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

//! Memory inspector core for STM32 Nucleo boards.
//!
//! The inspector shows a window of guest memory ([`memory::MemoryBuffer`]),
//! finds byte patterns in it ([`search`]) and watches it with conditional
//! memory breakpoints ([`breakpoint`]). An [`session::InspectorSession`] ties
//! these together and is fed one [`access::AccessEvent`] at a time.

pub mod access;
pub mod breakpoint;
pub mod condition;
pub mod memory;
pub mod search;
pub mod session;
