//! Platform Abstraction Layer
//!
//! This module provides a platform-agnostic way to obtain the GPIO
//! controller. Each platform (BCM2835, the host simulator) implements the
//! [`Platform`] trait and one is selected with Cargo features.
//!
//! # Usage
//!
//! ```rust
//! use drivers::platform::{CurrentPlatform, Platform};
//!
//! let gpio = unsafe { CurrentPlatform::gpio() };
//! ```

use crate::hal::gpio::GpioEvents;

/// Platform trait - implemented by each supported platform
pub trait Platform {
    /// GPIO controller of this platform.
    type Gpio: GpioEvents + Send;

    /// Platform name for debugging
    fn name() -> &'static str;

    /// Obtain a handle to the GPIO controller.
    ///
    /// # Safety
    /// On real hardware the register block must be mapped. Handles share
    /// the same registers, so callers must serialize configuration calls.
    unsafe fn gpio() -> Self::Gpio;
}

pub mod sim;

#[cfg(feature = "bcm2835")]
pub mod bcm2835;

// Platform selection based on Cargo features. Hosted builds always run on
// the simulator, even with a hardware feature enabled.
cfg_if::cfg_if! {
    if #[cfg(any(feature = "sim", not(target_os = "none")))] {
        pub use sim::SimPlatform as CurrentPlatform;
    } else if #[cfg(feature = "bcm2835")] {
        pub use bcm2835::Bcm2835Platform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features bcm2835\n\
            Or:  cargo build --features sim"
        );
    }
}

/// GPIO controller type of the selected platform.
pub type CurrentGpio = <CurrentPlatform as Platform>::Gpio;
