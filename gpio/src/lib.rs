//! GPIO pins with interrupt callbacks.
//!
//! Configures pins (direction, pull, edge trigger), reads and drives their
//! levels, and routes edge interrupts from a handful of pins back to
//! application callbacks.
//!
//! # Module Organization
//!
//! - [`controller`]: the [`Gpio`] façade (`setup`, `set`, `get`, `close`,
//!   dispatch)
//! - [`registry`]: fixed-capacity pin-to-callback table
//! - [`callback`]: callback ownership ([`CallbackHost`], [`ClosureHost`])
//! - [`event`]: interrupt-to-loop messages and queue
//! - [`system`]: the process-wide instance
//! - [`consts`]: named constants
//!
//! # Event Flow
//!
//! ```text
//! edge ─▶ GpioEvents::next_event ─▶ EventQueue ─▶ event loop
//!                                                    │
//!          callback ◀─ IrqRegistry::dispatch ◀─ Gpio::handle_message
//! ```
//!
//! # Usage Example
//!
//! ```
//! use drivers::platform::sim::SimGpio;
//! use drivers::{PinId, PinLevel};
//! use gpio::{ClosureHost, Gpio, ModeRequest};
//!
//! let mut gpio: Gpio<SimGpio, ClosureHost> = Gpio::new(SimGpio::new(), ClosureHost::new());
//!
//! let handle = gpio.host_mut().retain(|level| {
//!     let _ = level;
//! });
//! gpio.setup(27, ModeRequest::Interrupt(handle), None, None).unwrap();
//!
//! gpio.hal_mut().drive(PinId::new(27).unwrap(), PinLevel::High);
//! assert!(gpio.dispatch(27, 1));
//! gpio.close(27);
//! assert_eq!(gpio.host().live(), 0);
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod callback;
pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
pub mod event;
pub mod pin;
pub mod registry;
pub mod system;

pub use callback::{CallbackHost, CallbackRef, ClosureHost};
pub use config::{EVENT_QUEUE_DEPTH, GpioConfig, IRQ_SLOTS};
pub use controller::{Gpio, ModeRequest};
pub use error::{GpioError, Result};
pub use event::{EventQueue, Message, MessageSource};
pub use pin::PinRef;
pub use registry::{IrqRegistry, Registration, RegistryFull};

pub use drivers::hal::gpio::{Direction, EdgeTrigger, PullMode};
pub use drivers::{PinId, PinLevel};
