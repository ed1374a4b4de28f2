//! GPIO (General Purpose Input/Output) Hardware Abstraction Layer.
//!
//! This module defines the platform-independent pin types and the traits a
//! GPIO backend implements. The numeric discriminants of the enums are
//! stable and may be stored or exchanged with other components.

use core::fmt;
use core::num::NonZeroU32;

/// Physical pin identifier.
///
/// `0` is reserved as "no pin" and can never be constructed, which lets
/// `Option<PinId>` use `0` as its empty representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(NonZeroU32);

impl PinId {
    /// Returns `None` for the reserved identifier `0`.
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw value that does not name any variant of a GPIO enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidDiscriminant(pub u8);

/// Pin logic level.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low (0).
    Low = 0,
    /// Logic high (1).
    High = 1,
}

impl PinLevel {
    /// Normalize a raw register or script value to a level using bit 0.
    pub const fn from_bit(raw: u32) -> Self {
        if raw & 0x01 != 0 {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> bool {
        matches!(level, PinLevel::High)
    }
}

impl From<PinLevel> for u8 {
    fn from(level: PinLevel) -> u8 {
        level as u8
    }
}

impl TryFrom<u8> for PinLevel {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PinLevel::Low),
            1 => Ok(PinLevel::High),
            other => Err(InvalidDiscriminant(other)),
        }
    }
}

/// Pin direction.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Push-pull output.
    Output = 0,
    /// Plain input.
    Input = 1,
    /// Input with edge detection feeding the interrupt path.
    Interrupt = 2,
}

impl TryFrom<u8> for Direction {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Output),
            1 => Ok(Direction::Input),
            2 => Ok(Direction::Interrupt),
            other => Err(InvalidDiscriminant(other)),
        }
    }
}

/// Internal pull resistor configuration.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PullMode {
    /// Platform default (usually no pull, high impedance).
    #[default]
    None = 0,
    /// Enable internal pull-up resistor.
    Up = 1,
    /// Enable internal pull-down resistor.
    Down = 2,
}

impl TryFrom<u8> for PullMode {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PullMode::None),
            1 => Ok(PullMode::Up),
            2 => Ok(PullMode::Down),
            other => Err(InvalidDiscriminant(other)),
        }
    }
}

/// Signal transition that raises a pin interrupt.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EdgeTrigger {
    /// Low-to-high transition.
    Rising = 0,
    /// High-to-low transition.
    Falling = 1,
    /// Any transition.
    Both = 2,
}

impl EdgeTrigger {
    /// Whether a transition `from -> to` fires this trigger.
    pub fn fires_on(self, from: PinLevel, to: PinLevel) -> bool {
        match (self, from, to) {
            (_, a, b) if a == b => false,
            (EdgeTrigger::Rising, _, to) => to == PinLevel::High,
            (EdgeTrigger::Falling, _, to) => to == PinLevel::Low,
            (EdgeTrigger::Both, _, _) => true,
        }
    }
}

impl TryFrom<u8> for EdgeTrigger {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EdgeTrigger::Rising),
            1 => Ok(EdgeTrigger::Falling),
            2 => Ok(EdgeTrigger::Both),
            other => Err(InvalidDiscriminant(other)),
        }
    }
}

/// Everything a backend needs to put a pin into service.
///
/// `edge` is only meaningful when `direction` is [`Direction::Interrupt`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinConfig {
    pub direction: Direction,
    pub pull: PullMode,
    pub edge: EdgeTrigger,
}

impl PinConfig {
    pub const fn new(direction: Direction, pull: PullMode, edge: EdgeTrigger) -> Self {
        Self {
            direction,
            pull,
            edge,
        }
    }
}

/// An edge detected by the hardware on an interrupt-configured pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinEvent {
    pub pin: PinId,
    /// Level sampled after the edge.
    pub level: PinLevel,
}

/// GPIO backend trait.
///
/// Each call programs exactly one pin. Backends validate identifiers
/// themselves; callers may also ask [`is_valid_pin`](GpioHal::is_valid_pin)
/// up front to avoid touching hardware with a bad identifier.
pub trait GpioHal {
    /// Error type for GPIO operations.
    type Error: fmt::Debug;

    /// Whether `pin` exists on this controller.
    fn is_valid_pin(&self, pin: PinId) -> bool;

    /// Apply direction, pull and (for interrupt pins) edge detection.
    fn configure(&mut self, pin: PinId, config: PinConfig) -> Result<(), Self::Error>;

    /// Return a pin to high-impedance input with event detection off.
    fn deconfigure(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Read the current logic level of a pin.
    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error>;

    /// Drive an output pin.
    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error>;
}

/// Extension trait for backends that latch edge events.
pub trait GpioEvents: GpioHal {
    /// Take the next latched edge event, clearing it in hardware.
    ///
    /// Called from interrupt context until it returns `None`.
    fn next_event(&mut self) -> Option<PinEvent>;
}

/// Input pin trait.
///
/// This trait represents a single GPIO pin configured as an input.
pub trait InputPin {
    /// Error type for read operations.
    type Error: fmt::Debug;

    /// Read the pin state.
    fn read(&self) -> Result<PinLevel, Self::Error>;

    /// Check if the pin is currently high.
    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.read()? == PinLevel::High)
    }

    /// Check if the pin is currently low.
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self.read()? == PinLevel::Low)
    }
}

/// Output pin trait.
///
/// This trait represents a single GPIO pin configured as an output.
pub trait OutputPin {
    /// Error type for write operations.
    type Error: fmt::Debug;

    /// Set the pin to a specific level.
    fn set_level(&mut self, level: PinLevel) -> Result<(), Self::Error>;

    /// Set the pin to logic high.
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinLevel::High)
    }

    /// Set the pin to logic low.
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinLevel::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_zero_is_reserved() {
        assert!(PinId::new(0).is_none());
        assert_eq!(PinId::new(17).map(PinId::get), Some(17));
        assert_eq!(core::mem::size_of::<Option<PinId>>(), 4);
    }

    #[test]
    fn test_level_normalization() {
        assert_eq!(PinLevel::from_bit(0), PinLevel::Low);
        assert_eq!(PinLevel::from_bit(1), PinLevel::High);
        assert_eq!(PinLevel::from_bit(0xfe), PinLevel::Low);
        assert_eq!(PinLevel::from_bit(0x03), PinLevel::High);
        assert_eq!(u8::from(PinLevel::High), 1);
    }

    #[test]
    fn test_discriminants_are_stable() {
        assert_eq!(PinLevel::try_from(1), Ok(PinLevel::High));
        assert_eq!(Direction::try_from(2), Ok(Direction::Interrupt));
        assert_eq!(PullMode::try_from(1), Ok(PullMode::Up));
        assert_eq!(EdgeTrigger::try_from(2), Ok(EdgeTrigger::Both));
        assert_eq!(EdgeTrigger::try_from(3), Err(InvalidDiscriminant(3)));
    }

    #[test]
    fn test_edge_trigger_transitions() {
        use PinLevel::*;

        assert!(EdgeTrigger::Rising.fires_on(Low, High));
        assert!(!EdgeTrigger::Rising.fires_on(High, Low));
        assert!(EdgeTrigger::Falling.fires_on(High, Low));
        assert!(!EdgeTrigger::Falling.fires_on(Low, High));
        assert!(EdgeTrigger::Both.fires_on(Low, High));
        assert!(EdgeTrigger::Both.fires_on(High, Low));
        assert!(!EdgeTrigger::Both.fires_on(High, High));
    }
}
