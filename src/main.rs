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

use std::{fmt::Write, path::Path};

use nucleoscope::{
    access::AccessEvent,
    breakpoint::{Breakpoint, BreakpointId, BreakpointSet, BreakpointSpec},
    memory::MemoryBuffer,
    search::PatternSearch,
};

mod cli;

use cli::{Args, Command};

fn load_specs(path: &Path) -> Result<Vec<BreakpointSpec>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("Could not read {}: {err}", path.display()))?;
    let specs = serde_json::from_str(&text)
        .map_err(|err| format!("Could not parse {}: {err}", path.display()))?;
    Ok(specs)
}

fn load_dump(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    Ok(std::fs::read(path).map_err(|err| format!("Could not read {}: {err}", path.display()))?)
}

/// Runs one subcommand, returning what it prints on success.
fn run(command: Command) -> Result<String, Box<dyn std::error::Error>> {
    let mut out = String::new();
    match command {
        Command::Search {
            dump,
            pattern,
            base,
        } => {
            let search = PatternSearch::parse(&pattern)?;
            let buffer = MemoryBuffer::new(base, load_dump(&dump)?)?;
            log::debug!(
                "Searching {} bytes at {} for {:02x?}",
                buffer.len(),
                buffer.base(),
                search.pattern()
            );
            let matches = search.addresses(&buffer);
            if matches.is_empty() {
                writeln!(out, "no match")?;
            }
            for address in matches {
                writeln!(out, "{}", address)?;
            }
        }
        Command::Check {
            breakpoints,
            address,
            value,
            access,
            source,
        } => {
            let set = BreakpointSet::from_specs(load_specs(&breakpoints)?)?;
            let event = AccessEvent::new(address, value, access, source);
            match set.find_match(&event).into_result()? {
                Some(bp) => writeln!(out, "{}", bp)?,
                None => writeln!(out, "no match")?,
            }
        }
        Command::Validate { breakpoints } => {
            let specs = load_specs(&breakpoints)?;
            let total = specs.len();
            let mut rejected = vec![];
            for (i, spec) in specs.into_iter().enumerate() {
                let label = if spec.name.is_empty() {
                    format!("#{}", i + 1)
                } else {
                    format!("#{} \"{}\"", i + 1, spec.name)
                };
                // Ids are positional here; they are only used for display.
                match Breakpoint::new(BreakpointId(i as u32 + 1), spec) {
                    Ok(bp) => log::info!("{} ok: {}", label, bp),
                    Err(err) => rejected.push(format!("{}: {}", label, err)),
                }
            }
            if !rejected.is_empty() {
                return Err(format!(
                    "{}\n{} of {} breakpoints are invalid.",
                    rejected.join("\n"),
                    rejected.len(),
                    total
                )
                .into());
            }
            writeln!(out, "{total} breakpoints ok")?;
        }
        Command::Dump {
            dump,
            base,
            start,
            length,
            fill,
        } => {
            let buffer = match dump {
                Some(path) => MemoryBuffer::new(base, load_dump(&path)?)?,
                None => MemoryBuffer::filled(base, length, fill)?,
            };
            out.push_str(&buffer.hexdump(start.unwrap_or(base), length)?);
        }
    }
    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse()?;
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    print!("{}", run(args.command)?);
    Ok(())
}
