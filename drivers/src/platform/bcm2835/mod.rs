//! BCM2835 (Raspberry Pi 1/Zero) platform.

pub mod gpio;
pub mod interrupt;

use super::Platform;
use gpio::Bcm2835Gpio;

pub struct Bcm2835Platform;

impl Platform for Bcm2835Platform {
    type Gpio = Bcm2835Gpio;

    fn name() -> &'static str {
        "BCM2835 (Raspberry Pi 1/Zero)"
    }

    unsafe fn gpio() -> Bcm2835Gpio {
        unsafe { Bcm2835Gpio::new() }
    }
}
