// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the nucleoscope project.

use nucleoscope::{
    breakpoint::{AccessType, BreakpointSpec},
    memory::{Address, MemoryBuffer},
    session::InspectorSession,
};

#[macro_export]
macro_rules! assert_hex_eq {
    ($left: expr, $right: expr$(,)?) => {{
        let left: u32 = $left;
        let right: u32 = $right;
        assert_eq!(
            left,
            right,
            "Comparing {left_s} with {right_s} failed:\n0x{left:08x} {left_s}\n0x{right:08x} \
             {right_s}\n0b{left:032b} {left_s}\n0b{right:032b} {right_s}",
            left_s = stringify!($left),
            right_s = stringify!($right),
            left = left,
            right = right,
        );
    }};
}

/// Scratch word in SRAM used throughout the tests.
#[allow(dead_code)]
pub const COUNTER: Address = Address(0x2000_0000);

#[allow(dead_code)]
pub fn write_watch(address: Address, size: u32, condition: &str) -> BreakpointSpec {
    BreakpointSpec::new(address, size, AccessType::WRITE).with_condition(condition)
}

#[allow(dead_code)]
pub fn make_test_session(len: usize) -> InspectorSession {
    let buffer = MemoryBuffer::new(COUNTER, vec![0; len]).unwrap();
    let mut session = InspectorSession::new(buffer);
    session.start();
    session
}
