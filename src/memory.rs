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

//! Guest addresses, watched range sizes and the inspected memory buffer.

mod address;
mod buffer;
mod size;

pub use address::*;
pub use buffer::*;
pub use size::*;

/// Start of SRAM on STM32 parts, where the inspector points by default.
pub const SRAM_START: Address = Address(0x2000_0000);

/// Default number of bytes shown by the inspector.
pub const DEFAULT_BUFFER_LEN: usize = 256;
