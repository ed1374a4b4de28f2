//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines generic traits for interacting with GPIO hardware.
//! They are implemented by the platform drivers, allowing the pin façade
//! and its interrupt registry to be written in a platform-independent
//! manner.
//!
//! # Design Principles
//!
//! - **Zero-cost abstractions**: Traits compile to direct hardware access
//! - **Type safety**: Use associated types to catch errors at compile time
//! - **No platform leakage**: Traits must not reference platform-specific types
//!
//! # Available Interfaces
//!
//! - [`gpio`]: General Purpose Input/Output control and edge events

pub mod gpio;
