//! Pin configuration façade.
//!
//! [`Gpio`] owns the hardware backend, the callback host and the interrupt
//! registry. Configuration of a pin and registration of its callback happen
//! as one unit: if either half fails the other is undone, and a handle
//! passed in is always either stored or released.

use common::sync::IrqControl;
use drivers::hal::gpio::{Direction, EdgeTrigger, PinConfig, PullMode};
use drivers::{GpioEvents, GpioHal, PinId, PinLevel};

use crate::callback::CallbackHost;
use crate::config::{GpioConfig, IRQ_SLOTS};
use crate::error::{GpioError, Result};
use crate::event::{self, EventQueue, Message, MessageSource};
use crate::pin::PinRef;
use crate::registry::{IrqRegistry, RegistryFull};

/// What a pin should become. The variant decides the direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModeRequest<H> {
    /// Output, driven to the given level after configuration.
    Output(PinLevel),
    Input,
    /// Edge interrupt delivering to the callback behind the handle.
    Interrupt(H),
}

impl<H> ModeRequest<H> {
    pub fn direction(&self) -> Direction {
        match self {
            ModeRequest::Output(_) => Direction::Output,
            ModeRequest::Input => Direction::Input,
            ModeRequest::Interrupt(_) => Direction::Interrupt,
        }
    }
}

/// GPIO pins with interrupt callbacks.
///
/// All methods take `&mut self`, so configuration, close and dispatch are
/// serialized by construction. Callbacks run inside [`dispatch`](Self::dispatch)
/// and cannot reach back into the same `Gpio`.
pub struct Gpio<H: GpioHal, C: CallbackHost, const N: usize = IRQ_SLOTS> {
    hw: H,
    host: C,
    registry: IrqRegistry<C::Handle, N>,
    config: GpioConfig,
}

impl<H: GpioHal, C: CallbackHost, const N: usize> Gpio<H, C, N> {
    pub fn new(hw: H, host: C) -> Self {
        Self::with_config(hw, host, GpioConfig::default())
    }

    pub fn with_config(hw: H, host: C, config: GpioConfig) -> Self {
        Self {
            hw,
            host,
            registry: IrqRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &GpioConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hw
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn host(&self) -> &C {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut C {
        &mut self.host
    }

    pub fn registry(&self) -> &IrqRegistry<C::Handle, N> {
        &self.registry
    }

    fn resolve(&self, raw: u32) -> Result<PinId> {
        PinId::new(raw)
            .filter(|&pin| self.hw.is_valid_pin(pin))
            .ok_or(GpioError::InvalidPin(raw))
    }

    /// Give back a handle that was handed to `setup` but not stored.
    ///
    /// When the registry already holds the very same handle for the pin,
    /// the caller's reference is that one and only the slot is cleared.
    fn discard(&mut self, pin: Option<PinId>, callback: C::Handle) {
        match pin {
            Some(pin) if self.registry.lookup(pin) == Some(callback) => {
                self.registry.unregister(pin, &mut self.host);
            }
            Some(pin) => {
                self.host.release(callback);
                self.registry.unregister(pin, &mut self.host);
            }
            None => self.host.release(callback),
        }
    }

    /// Configure a pin.
    ///
    /// `pull` and `edge` fall back to [`GpioConfig`]; `edge` only matters
    /// for [`ModeRequest::Interrupt`]. An interrupt handle is owned by the
    /// subsystem from here on: it is stored on success and released on any
    /// failure. Configuring a pin that had a callback as input or output
    /// releases that callback. A pin whose initial output level cannot be
    /// written is deconfigured again.
    pub fn setup(
        &mut self,
        pin: u32,
        mode: ModeRequest<C::Handle>,
        pull: Option<PullMode>,
        edge: Option<EdgeTrigger>,
    ) -> Result<()> {
        let callback = match mode {
            ModeRequest::Interrupt(callback) => Some(callback),
            _ => None,
        };

        let pin = match self.resolve(pin) {
            Ok(pin) => pin,
            Err(err) => {
                if let Some(callback) = callback {
                    self.discard(None, callback);
                }
                return Err(err);
            }
        };

        let config = PinConfig::new(
            mode.direction(),
            pull.unwrap_or(self.config.default_pull),
            edge.unwrap_or(self.config.default_edge),
        );

        if let Err(err) = self.hw.configure(pin, config) {
            log::warn!("gpio: pin {pin} rejected {config:?}: {err:?}");
            if let Some(callback) = callback {
                self.discard(Some(pin), callback);
            }
            return Err(GpioError::HardwareConfig);
        }

        match mode {
            ModeRequest::Interrupt(callback) => {
                match self.registry.register(pin, callback, &mut self.host) {
                    Ok(_) => Ok(()),
                    Err(RegistryFull(callback)) => {
                        log::warn!("gpio: too many irq pins, pin {pin} rolled back");
                        if let Err(err) = self.hw.deconfigure(pin) {
                            log::warn!("gpio: rollback of pin {pin} failed: {err:?}");
                        }
                        self.host.release(callback);
                        Err(GpioError::RegistryFull { capacity: N })
                    }
                }
            }
            ModeRequest::Output(level) => {
                self.drop_callback(pin);
                self.hw.write(pin, level).map_err(|err| {
                    log::warn!("gpio: initial level on pin {pin} failed: {err:?}");
                    if let Err(err) = self.hw.deconfigure(pin) {
                        log::warn!("gpio: rollback of pin {pin} failed: {err:?}");
                    }
                    GpioError::Hardware
                })
            }
            ModeRequest::Input => {
                self.drop_callback(pin);
                Ok(())
            }
        }
    }

    fn drop_callback(&mut self, pin: PinId) {
        if self.registry.unregister(pin, &mut self.host) {
            log::debug!("gpio: pin {pin} left interrupt mode, callback released");
        }
    }

    /// Drive an output pin.
    pub fn set(&mut self, pin: u32, level: PinLevel) -> Result<()> {
        let pin = self.resolve(pin)?;
        self.hw.write(pin, level).map_err(|err| {
            log::debug!("gpio: write to pin {pin} failed: {err:?}");
            GpioError::Hardware
        })
    }

    /// Read the level of a pin.
    pub fn get(&self, pin: u32) -> Result<PinLevel> {
        let pin = self.resolve(pin)?;
        self.hw.read(pin).map_err(|err| {
            log::debug!("gpio: read of pin {pin} failed: {err:?}");
            GpioError::Hardware
        })
    }

    /// Return a pin to idle and drop its callback.
    ///
    /// Always succeeds from the caller's point of view. The callback is
    /// released even when the hardware refuses to deconfigure, and no
    /// dispatch reaches it once this returns. Pins the backend does not
    /// know are never passed to it.
    pub fn close(&mut self, pin: u32) {
        let Some(pin) = PinId::new(pin) else {
            log::debug!("gpio: close of reserved pin 0 ignored");
            return;
        };

        if !self.hw.is_valid_pin(pin) {
            log::debug!("gpio: close of unknown pin {pin}, hardware untouched");
        } else if let Err(err) = self.hw.deconfigure(pin) {
            log::debug!("gpio: deconfigure of pin {pin} failed: {err:?}");
        }
        if !self.registry.unregister(pin, &mut self.host) {
            log::trace!("gpio: pin {pin} closed without callback");
        }
    }

    /// Close every pin that has a callback.
    pub fn close_all(&mut self) {
        let slots = self.registry.slots();
        let pins: [Option<PinId>; N] = core::array::from_fn(|i| slots[i].pin());

        for pin in pins.into_iter().flatten() {
            self.close(pin.get());
        }
    }

    /// Deliver an interrupt event for `pin` to its callback.
    ///
    /// Returns whether a callback ran. Unknown pins are ignored.
    pub fn dispatch(&mut self, pin: u32, arg: i32) -> bool {
        match PinId::new(pin) {
            Some(pin) => self.registry.dispatch(pin, arg, &mut self.host),
            None => false,
        }
    }

    /// Event loop handler. Returns `false` for messages of other sources.
    pub fn handle_message(&mut self, message: &Message) -> bool {
        if message.source != MessageSource::Gpio {
            return false;
        }

        match message.gpio_pin() {
            Some(pin) => {
                self.registry.dispatch(pin, message.arg2, &mut self.host);
            }
            None => log::trace!("gpio: message with bad pin {} dropped", message.arg1),
        }
        true
    }

    /// Borrow one pin as an [`InputPin`](drivers::hal::gpio::InputPin) /
    /// [`OutputPin`](drivers::hal::gpio::OutputPin).
    pub fn pin(&mut self, pin: u32) -> Result<PinRef<'_, H, C, N>> {
        let pin = self.resolve(pin)?;
        Ok(PinRef::new(self, pin))
    }
}

impl<H: GpioEvents, C: CallbackHost, const N: usize> Gpio<H, C, N> {
    /// Move latched edge events from the owned backend into `queue`.
    pub fn capture_events<I: IrqControl, const Q: usize>(
        &mut self,
        queue: &EventQueue<I, Q>,
    ) -> usize {
        event::capture(&mut self.hw, queue)
    }
}

impl<H, C, const N: usize> core::fmt::Debug for Gpio<H, C, N>
where
    H: GpioHal + core::fmt::Debug,
    C: CallbackHost + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gpio")
            .field("hw", &self.hw)
            .field("host", &self.host)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
