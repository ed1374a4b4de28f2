//! Host simulation platform.

pub mod gpio;

pub use gpio::{SimError, SimGpio};

use super::Platform;

pub struct SimPlatform;

impl Platform for SimPlatform {
    type Gpio = SimGpio;

    fn name() -> &'static str {
        "Simulated GPIO"
    }

    unsafe fn gpio() -> SimGpio {
        SimGpio::new()
    }
}
