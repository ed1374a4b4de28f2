//! Process-wide GPIO instance.
//!
//! One [`Gpio`] over the current platform and a [`ClosureHost`], created
//! explicitly with [`init`] and never recreated. Callers go through the
//! free functions below, which serialize on one lock. Callbacks run with
//! the lock released, so they may call back into this module; a callback
//! released while it runs is dropped once it returns.
//!
//! ```
//! use gpio::{consts, system, GpioConfig};
//!
//! system::init(GpioConfig::default()).unwrap();
//! system::setup_output(17, consts::LOW, None).unwrap();
//! system::set(17, consts::HIGH).unwrap();
//! assert_eq!(system::get(17).unwrap(), consts::HIGH);
//! system::close(17);
//! ```

use common::arch::CurrentIrq;
use drivers::hal::gpio::{EdgeTrigger, PullMode};
use drivers::{CurrentGpio, CurrentPlatform, GpioEvents, PinLevel, Platform};
use spin::Mutex;

use crate::callback::ClosureHost;
use crate::config::{EVENT_QUEUE_DEPTH, GpioConfig, IRQ_SLOTS};
use crate::controller::{Gpio, ModeRequest};
use crate::error::{GpioError, Result};
use crate::event::{self, EventQueue, Message, MessageSource};

pub type SystemGpio = Gpio<CurrentGpio, ClosureHost, IRQ_SLOTS>;

// ============================================================================
// Internal State (not exposed)
// ============================================================================

static SYSTEM: Mutex<Option<SystemGpio>> = Mutex::new(None);

static EVENTS: EventQueue<CurrentIrq, EVENT_QUEUE_DEPTH> = EventQueue::new();

/// Create the instance. Fails if it already exists.
pub fn init(config: GpioConfig) -> Result<()> {
    let mut system = SYSTEM.lock();
    if system.is_some() {
        return Err(GpioError::AlreadyInitialized);
    }

    // SAFETY: this is the only long-lived handle; interrupt handlers only
    // touch the event status registers through their own handle.
    let hw = unsafe { CurrentPlatform::gpio() };
    *system = Some(Gpio::with_config(hw, ClosureHost::new(), config));
    log::info!(
        "gpio: {} ready, {} irq slots, default edge {:?}",
        CurrentPlatform::name(),
        IRQ_SLOTS,
        config.default_edge
    );

    Ok(())
}

pub fn is_initialized() -> bool {
    SYSTEM.lock().is_some()
}

/// Run `f` on the instance.
pub fn with<R>(f: impl FnOnce(&mut SystemGpio) -> R) -> Result<R> {
    SYSTEM
        .lock()
        .as_mut()
        .map(f)
        .ok_or(GpioError::NotInitialized)
}

/// Queue shared by the GPIO interrupt handler and the event loop.
pub fn events() -> &'static EventQueue<CurrentIrq, EVENT_QUEUE_DEPTH> {
    &EVENTS
}

/// GPIO interrupt handler body: move latched edges into [`events`].
pub fn on_interrupt(hw: &mut impl GpioEvents) -> usize {
    event::capture(hw, &EVENTS)
}

pub fn setup_input(pin: u32, pull: Option<PullMode>) -> Result<()> {
    with(|gpio| gpio.setup(pin, ModeRequest::Input, pull, None))?
}

pub fn setup_output(pin: u32, level: PinLevel, pull: Option<PullMode>) -> Result<()> {
    with(|gpio| gpio.setup(pin, ModeRequest::Output(level), pull, None))?
}

/// Configure an interrupt pin calling `callback` with the level after
/// each edge.
pub fn setup_irq<F>(
    pin: u32,
    callback: F,
    pull: Option<PullMode>,
    edge: Option<EdgeTrigger>,
) -> Result<()>
where
    F: FnMut(i32) + Send + 'static,
{
    with(|gpio| {
        let handle = gpio.host_mut().retain(callback);
        gpio.setup(pin, ModeRequest::Interrupt(handle), pull, edge)
    })?
}

pub fn set(pin: u32, level: PinLevel) -> Result<()> {
    with(|gpio| gpio.set(pin, level))?
}

pub fn get(pin: u32) -> Result<PinLevel> {
    with(|gpio| gpio.get(pin))?
}

/// Close a pin. Does nothing before [`init`].
pub fn close(pin: u32) {
    let _ = with(|gpio| gpio.close(pin));
}

/// Event loop handler for GPIO-tagged messages.
///
/// Returns `false` for other sources and before [`init`].
pub fn handle_message(message: &Message) -> bool {
    if message.source != MessageSource::Gpio {
        return false;
    }

    let taken = with(|gpio| {
        let handle = gpio.registry().lookup(message.gpio_pin()?)?;
        gpio.host_mut().take(handle).map(|callback| (handle, callback))
    });

    match taken {
        Ok(Some((handle, mut callback))) => {
            callback(message.arg2);
            // Dropped instead if the call closed or replaced its own pin
            let _ = with(|gpio| gpio.host_mut().put_back(handle, callback));
            true
        }
        Ok(None) => {
            log::trace!("gpio: message for pin {} has no runnable callback", message.arg1);
            true
        }
        Err(_) => false,
    }
}
