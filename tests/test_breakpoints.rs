// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the nucleoscope project.

use nucleoscope::{
    access::AccessEvent,
    breakpoint::{
        match_breakpoint, AccessType, Breakpoint, BreakpointError, BreakpointId, BreakpointSet,
        BreakpointSpec,
    },
    memory::Address,
};

#[macro_use]
mod utils;

use utils::{write_watch, COUNTER};

const BREAKPOINTS_JSON: &str = include_str!("./inputs/breakpoints.json");
const INVALID_BREAKPOINTS_JSON: &str = include_str!("./inputs/invalid_breakpoints.json");

fn single(spec: BreakpointSpec) -> [Breakpoint; 1] {
    [Breakpoint::new(BreakpointId(1), spec).unwrap()]
}

#[test_log::test]
fn test_conditional_write_watch() {
    let breakpoints = single(write_watch(COUNTER, 4, "value > 10"));
    let address = Address(0x2000_0002);

    let hit = match_breakpoint(&AccessEvent::write(address, 20), &breakpoints);
    assert_eq!(hit.hit.map(|bp| bp.id), Some(BreakpointId(1)));
    assert!(hit.faults.is_empty());

    assert_eq!(
        match_breakpoint(&AccessEvent::write(address, 5), &breakpoints).into_result(),
        Ok(None)
    );
    for value in [0, 5, 20, 255] {
        assert!(match_breakpoint(&AccessEvent::read(address, value), &breakpoints)
            .hit
            .is_none());
    }
}

#[test_log::test]
fn test_range_bounds() {
    let breakpoints = single(BreakpointSpec::new(COUNTER, 4, AccessType::BOTH));
    let hits = |address: u32| {
        match_breakpoint(&AccessEvent::read(Address(address), 0), &breakpoints)
            .hit
            .is_some()
    };
    assert!(!hits(0x1fff_ffff));
    assert!(hits(0x2000_0000));
    assert!(hits(0x2000_0003));
    assert!(!hits(0x2000_0004));
}

#[test_log::test]
fn test_first_match_wins() {
    let mut set = BreakpointSet::new();
    let wide = set
        .add(BreakpointSpec::new(COUNTER, 16, AccessType::BOTH).with_name("wide"))
        .unwrap();
    let narrow = set
        .add(BreakpointSpec::new(COUNTER, 1, AccessType::WRITE).with_name("narrow"))
        .unwrap();
    let event = AccessEvent::write(COUNTER, 1);
    for _ in 0..10 {
        assert_eq!(set.find_match(&event).hit.map(|bp| bp.id), Some(wide));
    }
    set.set_enabled(wide, false).unwrap();
    assert_eq!(set.find_match(&event).hit.map(|bp| bp.id), Some(narrow));
}

#[test_log::test]
fn test_disabled_never_match() {
    let breakpoints = single(BreakpointSpec::new(COUNTER, 4, AccessType::BOTH).with_enabled(false));
    for value in [0, 1, 0x80, 0xff] {
        for event in [
            AccessEvent::read(COUNTER, value),
            AccessEvent::write(COUNTER, value),
        ] {
            assert!(match_breakpoint(&event, &breakpoints).hit.is_none());
        }
    }
}

#[test_log::test]
fn test_faulting_condition_is_reported() {
    let breakpoints = single(write_watch(COUNTER, 1, "255 / (value - 7) > 1"));
    let err = match_breakpoint(&AccessEvent::write(COUNTER, 7), &breakpoints)
        .into_result()
        .unwrap_err();
    assert_eq!(err.faults.len(), 1);
    assert_eq!(err.faults[0].id, BreakpointId(1));
    assert_eq!(
        match_breakpoint(&AccessEvent::write(COUNTER, 8), &breakpoints)
            .into_result()
            .map(|bp| bp.map(|bp| bp.id)),
        Ok(Some(BreakpointId(1)))
    );
}

#[test_log::test]
fn test_load_definitions() {
    let specs: Vec<BreakpointSpec> = serde_json::from_str(BREAKPOINTS_JSON).unwrap();
    let set = BreakpointSet::from_specs(specs).unwrap();
    assert_eq!(set.len(), 3);

    let uart = set
        .find_match(&AccessEvent::write(Address(0x4000_4404), b'A'))
        .hit
        .unwrap();
    assert_eq!(uart.name, "usart2 tx");
    assert_eq!(uart.access, AccessType::WRITE);

    // The stack guard is disabled.
    assert!(set
        .find_match(&AccessEvent::read(Address(0x2000_8004), 0))
        .hit
        .is_none());

    let saved = serde_json::to_string(&set.to_specs()).unwrap();
    let reloaded: Vec<BreakpointSpec> = serde_json::from_str(&saved).unwrap();
    assert_eq!(reloaded, set.to_specs());
}

#[test_log::test]
fn test_invalid_definitions_are_rejected() {
    let specs: Vec<BreakpointSpec> = serde_json::from_str(INVALID_BREAKPOINTS_JSON).unwrap();
    let mut set = BreakpointSet::new();
    let results = specs
        .into_iter()
        .map(|spec| set.add(spec))
        .collect::<Vec<_>>();
    assert_eq!(results[0], Err(BreakpointError::ZeroSize));
    assert!(matches!(
        results[1],
        Err(BreakpointError::Condition { .. })
    ));
    assert!(results[2].is_ok());
    assert_eq!(set.len(), 1);
}
