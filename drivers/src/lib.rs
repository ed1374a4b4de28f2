//! GPIO Driver Subsystem
//!
//! This crate provides a layered architecture for GPIO hardware:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions and pin types
//! - [`platform`]: Platform-specific drivers (SoC level) and the simulator
//!
//! # Design Principles
//!
//! 1. **Separation of Concerns**: Register access stays in platform code
//! 2. **Zero-Cost Abstractions**: HAL traits compile to direct hardware access
//! 3. **Type Safety**: The reserved pin `0` cannot be represented as a [`PinId`]
//!
//! # Usage Example
//!
//! ```
//! use drivers::hal::gpio::{Direction, EdgeTrigger, PinConfig, PullMode};
//! use drivers::platform::sim::SimGpio;
//! use drivers::{GpioHal, PinId, PinLevel};
//!
//! let mut gpio = SimGpio::new();
//! let pin = PinId::new(17).unwrap();
//! let config = PinConfig::new(Direction::Output, PullMode::None, EdgeTrigger::Both);
//! gpio.configure(pin, config).unwrap();
//! gpio.write(pin, PinLevel::High).unwrap();
//! assert_eq!(gpio.read(pin).unwrap(), PinLevel::High);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod hal;
pub mod platform;

// Re-export commonly used types
pub use hal::gpio::{GpioEvents, GpioHal, PinEvent, PinId, PinLevel};
pub use platform::{CurrentGpio, CurrentPlatform, Platform};
