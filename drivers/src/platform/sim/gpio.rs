//! Simulated GPIO controller.
//!
//! Tracks direction, pull and level per pin and latches edge events the way
//! a real controller does, so the upper layers can be exercised on a host.
//! Input levels are driven from the outside with [`SimGpio::drive`].

use crate::hal::gpio::{
    Direction, GpioEvents, GpioHal, PinConfig, PinEvent, PinId, PinLevel, PullMode,
};
use heapless::Deque;

/// Number of lines, including the unaddressable line 0.
pub const SIM_PIN_COUNT: usize = 64;

/// Latched events kept before new ones are dropped.
pub const SIM_EVENT_DEPTH: usize = 32;

#[derive(Debug, Copy, Clone)]
struct SimPin {
    config: Option<PinConfig>,
    level: PinLevel,
    reject: bool,
}

impl SimPin {
    const IDLE: Self = Self {
        config: None,
        level: PinLevel::Low,
        reject: false,
    };
}

/// Simulated GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The identifier is outside the simulated range.
    InvalidPin,
    /// Fault injected with [`SimGpio::reject`].
    Rejected,
    /// Write to a pin that is not an output.
    NotOutput,
}

#[derive(Debug)]
pub struct SimGpio {
    pins: [SimPin; SIM_PIN_COUNT],
    events: Deque<PinEvent, SIM_EVENT_DEPTH>,
    dropped_events: usize,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    pub const fn new() -> Self {
        Self {
            pins: [SimPin::IDLE; SIM_PIN_COUNT],
            events: Deque::new(),
            dropped_events: 0,
        }
    }

    fn slot(&self, pin: PinId) -> Result<&SimPin, SimError> {
        self.pins.get(pin.get() as usize).ok_or(SimError::InvalidPin)
    }

    fn slot_mut(&mut self, pin: PinId) -> Result<&mut SimPin, SimError> {
        self.pins
            .get_mut(pin.get() as usize)
            .ok_or(SimError::InvalidPin)
    }

    /// Current configuration, `None` when the pin is idle.
    pub fn config(&self, pin: PinId) -> Option<PinConfig> {
        self.slot(pin).ok().and_then(|p| p.config)
    }

    pub fn is_configured(&self, pin: PinId) -> bool {
        self.config(pin).is_some()
    }

    /// Make every subsequent `configure` of `pin` fail (or succeed again).
    pub fn reject(&mut self, pin: PinId, reject: bool) {
        if let Ok(p) = self.slot_mut(pin) {
            p.reject = reject;
        }
    }

    /// Apply an external signal to a pin.
    ///
    /// Output pins ignore the signal. On an interrupt pin a transition
    /// matching its edge trigger latches a [`PinEvent`].
    pub fn drive(&mut self, pin: PinId, level: PinLevel) {
        let Ok(p) = self.slot_mut(pin) else {
            return;
        };
        let previous = p.level;
        let config = p.config;

        match config {
            Some(PinConfig {
                direction: Direction::Output,
                ..
            }) => return,
            Some(PinConfig {
                direction: Direction::Interrupt,
                edge,
                ..
            }) if edge.fires_on(previous, level) => {
                p.level = level;
                self.latch(PinEvent { pin, level });
            }
            _ => p.level = level,
        }
    }

    /// Latch an event directly, bypassing edge detection.
    pub fn latch(&mut self, event: PinEvent) {
        if self.events.push_back(event).is_err() {
            self.dropped_events += 1;
            log::warn!("sim gpio: event for pin {} dropped", event.pin);
        }
    }

    /// Number of latched events not yet taken.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Events lost because the latch was full.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }
}

impl GpioHal for SimGpio {
    type Error = SimError;

    fn is_valid_pin(&self, pin: PinId) -> bool {
        self.slot(pin).is_ok()
    }

    fn configure(&mut self, pin: PinId, config: PinConfig) -> Result<(), Self::Error> {
        let p = self.slot_mut(pin)?;
        if p.reject {
            return Err(SimError::Rejected);
        }

        p.config = Some(config);
        p.level = match (config.direction, config.pull) {
            (Direction::Output, _) => PinLevel::Low,
            (_, PullMode::Up) => PinLevel::High,
            (_, PullMode::Down) => PinLevel::Low,
            (_, PullMode::None) => p.level,
        };

        Ok(())
    }

    fn deconfigure(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.slot_mut(pin)?.config = None;
        Ok(())
    }

    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        Ok(self.slot(pin)?.level)
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error> {
        let p = self.slot_mut(pin)?;
        match p.config {
            Some(PinConfig {
                direction: Direction::Output,
                ..
            }) => {
                p.level = level;
                Ok(())
            }
            _ => Err(SimError::NotOutput),
        }
    }
}

impl GpioEvents for SimGpio {
    fn next_event(&mut self) -> Option<PinEvent> {
        self.events.pop_front()
    }
}
