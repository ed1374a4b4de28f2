//! Borrowed single-pin access.

use drivers::hal::gpio::{InputPin, OutputPin};
use drivers::{GpioHal, PinId, PinLevel};

use crate::callback::CallbackHost;
use crate::controller::Gpio;
use crate::error::{GpioError, Result};

/// One pin of a [`Gpio`], usable through the HAL pin traits.
pub struct PinRef<'a, H: GpioHal, C: CallbackHost, const N: usize> {
    gpio: &'a mut Gpio<H, C, N>,
    pin: PinId,
}

impl<'a, H: GpioHal, C: CallbackHost, const N: usize> PinRef<'a, H, C, N> {
    pub(crate) fn new(gpio: &'a mut Gpio<H, C, N>, pin: PinId) -> Self {
        Self { gpio, pin }
    }

    pub fn id(&self) -> PinId {
        self.pin
    }

    /// Close the pin, see [`Gpio::close`].
    pub fn close(self) {
        self.gpio.close(self.pin.get());
    }
}

impl<H: GpioHal, C: CallbackHost, const N: usize> InputPin for PinRef<'_, H, C, N> {
    type Error = GpioError;

    fn read(&self) -> Result<PinLevel> {
        self.gpio.get(self.pin.get())
    }
}

impl<H: GpioHal, C: CallbackHost, const N: usize> OutputPin for PinRef<'_, H, C, N> {
    type Error = GpioError;

    fn set_level(&mut self, level: PinLevel) -> Result<()> {
        self.gpio.set(self.pin.get(), level)
    }
}
