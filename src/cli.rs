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

use std::{borrow::Cow, path::PathBuf};

use clap::{Parser, Subcommand};
use nucleoscope::{
    access::AccessKind,
    memory::{maybe_hex, Address, FillPattern, DEFAULT_BUFFER_LEN, SRAM_START},
};

fn address(s: &str) -> Result<Address, Cow<'static, str>> {
    maybe_hex(s).map(Address).map_err(|err| {
        Cow::Owned(format!(
            "Expected decimal or 0x-prefixed hexadecimal address: {err}"
        ))
    })
}

fn byte_value(s: &str) -> Result<u8, Cow<'static, str>> {
    let value = maybe_hex(s).map_err(|err| Cow::Owned(err.to_string()))?;
    u8::try_from(value).map_err(|_| Cow::Borrowed("Value must fit in a byte (0-255)"))
}

/// STM32 Nucleo memory inspector
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Raise log verbosity; repeat for more. `RUST_LOG` overrides it.
    #[arg(short, long, global = true, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find a byte pattern in a memory dump.
    Search {
        /// Raw memory dump file.
        #[arg(value_name = "DUMP")]
        dump: PathBuf,
        /// Bytes to look for, e.g. "0xFF 0x00 16". Separated by spaces or commas.
        #[arg(value_name = "PATTERN")]
        pattern: String,
        /// Guest address of the first byte of the dump.
        #[arg(long, default_value_t = SRAM_START, value_parser = address)]
        base: Address,
    },
    /// Check which breakpoint a single memory access would hit.
    Check {
        /// JSON file with a list of breakpoint definitions.
        #[arg(value_name = "BREAKPOINTS")]
        breakpoints: PathBuf,
        /// Accessed address.
        #[arg(long, value_parser = address)]
        address: Address,
        /// Byte read or written.
        #[arg(long, value_parser = byte_value)]
        value: u8,
        #[arg(long, value_enum)]
        access: AccessKind,
        /// Label of whoever performed the access.
        #[arg(long, default_value = "CPU")]
        source: String,
    },
    /// Report breakpoint definitions that would be rejected.
    Validate {
        #[arg(value_name = "BREAKPOINTS")]
        breakpoints: PathBuf,
    },
    /// Print memory as a hex dump.
    Dump {
        /// Raw memory dump file. Without it a synthesized buffer is shown.
        #[arg(value_name = "DUMP")]
        dump: Option<PathBuf>,
        #[arg(long, default_value_t = SRAM_START, value_parser = address)]
        base: Address,
        /// First address to print; defaults to `--base`.
        #[arg(long, value_parser = address)]
        start: Option<Address>,
        #[arg(long, default_value_t = DEFAULT_BUFFER_LEN)]
        length: usize,
        /// Contents of the synthesized buffer.
        #[arg(long, value_enum, default_value_t = FillPattern::Incrementing)]
        fill: FillPattern,
    },
}

impl Args {
    /// Parse command-line arguments from the process environment.
    pub fn parse() -> Result<Self, String> {
        let retval = <Self as clap::Parser>::parse();
        if let Command::Dump {
            base,
            start: Some(start),
            ..
        } = &retval.command
        {
            if start < base {
                return Err(format!(
                    "Invalid arguments: Given start address {} is below base address {}.",
                    start, base
                ));
            }
        }
        Ok(retval)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
