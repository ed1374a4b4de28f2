//! Shared low-level primitives.
//!
//! - [`sync`]: interrupt-safe locking used between interrupt handlers and
//!   the main event loop
//! - [`arch`]: per-architecture interrupt masking

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
