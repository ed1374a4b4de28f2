//! Named pin constants.
//!
//! The numeric values are the enum discriminants and do not change between
//! releases, so they can be exported to scripts or stored.

use drivers::PinLevel;
use drivers::hal::gpio::{Direction, EdgeTrigger, PullMode};

pub const LOW: PinLevel = PinLevel::Low;
pub const HIGH: PinLevel = PinLevel::High;

pub const OUTPUT: Direction = Direction::Output;
pub const INPUT: Direction = Direction::Input;
pub const IRQ: Direction = Direction::Interrupt;

pub const PULLUP: PullMode = PullMode::Up;
pub const PULLDOWN: PullMode = PullMode::Down;

pub const RISING: EdgeTrigger = EdgeTrigger::Rising;
pub const FALLING: EdgeTrigger = EdgeTrigger::Falling;
pub const BOTH: EdgeTrigger = EdgeTrigger::Both;

/// Every constant by name.
pub const TABLE: [(&str, u8); 10] = [
    ("LOW", LOW as u8),
    ("HIGH", HIGH as u8),
    ("OUTPUT", OUTPUT as u8),
    ("INPUT", INPUT as u8),
    ("IRQ", IRQ as u8),
    ("PULLUP", PULLUP as u8),
    ("PULLDOWN", PULLDOWN as u8),
    ("RISING", RISING as u8),
    ("FALLING", FALLING as u8),
    ("BOTH", BOTH as u8),
];

/// Look a constant up by name.
pub fn lookup(name: &str) -> Option<u8> {
    TABLE.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
}
