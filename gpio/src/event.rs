//! Interrupt-to-loop event plumbing.
//!
//! Edge interrupts are not handled in interrupt context. The handler moves
//! latched [`PinEvent`]s into an [`EventQueue`] as GPIO-tagged
//! [`Message`]s; the main loop pops messages one at a time and hands the
//! GPIO ones to [`Gpio::handle_message`](crate::Gpio::handle_message). The
//! queue is shared with unrelated event sources and keeps FIFO order.

use core::sync::atomic::{AtomicUsize, Ordering};

use common::sync::{IrqControl, IrqSpinLock};
use drivers::{GpioEvents, PinEvent, PinId};
use heapless::Deque;

/// Producer of a loop message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Gpio,
    Other(u16),
}

/// Tagged message on the shared event loop.
///
/// For [`MessageSource::Gpio`], `arg1` is the pin and `arg2` the argument
/// passed to the callback (the level after the edge).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: MessageSource,
    pub arg1: i32,
    pub arg2: i32,
}

impl Message {
    /// GPIO message for `pin`. `None` when the pin does not fit in `arg1`.
    pub fn gpio(pin: PinId, arg: i32) -> Option<Self> {
        let arg1 = i32::try_from(pin.get()).ok()?;
        Some(Self {
            source: MessageSource::Gpio,
            arg1,
            arg2: arg,
        })
    }

    /// Pin of a GPIO message; `None` for other sources or a bad `arg1`.
    pub fn gpio_pin(&self) -> Option<PinId> {
        match self.source {
            MessageSource::Gpio => u32::try_from(self.arg1).ok().and_then(PinId::new),
            MessageSource::Other(_) => None,
        }
    }
}

impl TryFrom<PinEvent> for Message {
    type Error = PinEvent;

    fn try_from(event: PinEvent) -> Result<Self, PinEvent> {
        Message::gpio(event.pin, event.level as i32).ok_or(event)
    }
}

/// Bounded FIFO shared between interrupt handlers and the loop.
///
/// Posting never blocks; when the queue is full the new message is
/// dropped and counted.
pub struct EventQueue<I: IrqControl, const N: usize> {
    messages: IrqSpinLock<Deque<Message, N>, I>,
    dropped: AtomicUsize,
}

impl<I: IrqControl, const N: usize> EventQueue<I, N> {
    pub const fn new() -> Self {
        Self {
            messages: IrqSpinLock::new(Deque::new()),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Append a message. Returns it back if the queue is full.
    pub fn post(&self, message: Message) -> Result<(), Message> {
        let result = self.messages.with(|q| q.push_back(message));
        if result.is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            log::warn!("event queue full, {:?} dropped", message.source);
        }
        result
    }

    /// Take the oldest message.
    pub fn pop(&self) -> Option<Message> {
        self.messages.with(|q| q.pop_front())
    }

    pub fn len(&self) -> usize {
        self.messages.with(|q| q.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages lost to overflow since creation.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<I: IrqControl, const N: usize> Default for EventQueue<I, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Move every latched edge event from `hw` into `queue`.
///
/// Meant for the GPIO interrupt handler. Returns the number of events
/// queued; events that did not fit, or whose pin cannot be carried in a
/// message, are dropped.
pub fn capture<H, I, const N: usize>(hw: &mut H, queue: &EventQueue<I, N>) -> usize
where
    H: GpioEvents,
    I: IrqControl,
{
    let mut queued = 0;
    while let Some(event) = hw.next_event() {
        match Message::try_from(event) {
            Ok(message) => {
                if queue.post(message).is_ok() {
                    queued += 1;
                }
            }
            Err(event) => log::warn!("gpio event for pin {} dropped, pin out of range", event.pin),
        }
    }
    queued
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::arch::host::HostIrq;
    use drivers::PinLevel;
    use drivers::hal::gpio::{Direction, EdgeTrigger, GpioHal, PinConfig, PullMode};
    use drivers::platform::sim::SimGpio;

    fn pin(n: u32) -> PinId {
        PinId::new(n).unwrap()
    }

    #[test]
    fn test_gpio_message_round_trip() {
        let msg = Message::gpio(pin(6), 42).unwrap();
        assert_eq!(msg.gpio_pin(), Some(pin(6)));
        assert_eq!(msg.arg2, 42);

        let other = Message {
            source: MessageSource::Other(3),
            arg1: 6,
            arg2: 0,
        };
        assert_eq!(other.gpio_pin(), None);

        let bad = Message {
            source: MessageSource::Gpio,
            arg1: -1,
            arg2: 0,
        };
        assert_eq!(bad.gpio_pin(), None);
    }

    #[test]
    fn test_queue_is_fifo_and_counts_overflow() {
        let queue: EventQueue<HostIrq, 2> = EventQueue::new();
        assert!(queue.post(Message::gpio(pin(1), 1).unwrap()).is_ok());
        assert!(queue.post(Message::gpio(pin(2), 2).unwrap()).is_ok());
        assert!(queue.post(Message::gpio(pin(3), 3).unwrap()).is_err());
        assert_eq!(queue.dropped(), 1);

        assert_eq!(queue.pop().and_then(|m| m.gpio_pin()), Some(pin(1)));
        assert_eq!(queue.pop().and_then(|m| m.gpio_pin()), Some(pin(2)));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_capture_drains_hardware_latch() {
        let mut hw = SimGpio::new();
        let config = PinConfig::new(Direction::Interrupt, PullMode::None, EdgeTrigger::Both);
        hw.configure(pin(4), config).unwrap();
        hw.drive(pin(4), PinLevel::High);
        hw.drive(pin(4), PinLevel::Low);

        let queue: EventQueue<HostIrq, 8> = EventQueue::new();
        assert_eq!(capture(&mut hw, &queue), 2);
        assert_eq!(hw.pending_events(), 0);

        let first = queue.pop().unwrap();
        assert_eq!(first, Message::gpio(pin(4), 1).unwrap());
        let second = queue.pop().unwrap();
        assert_eq!(second, Message::gpio(pin(4), 0).unwrap());
    }

    #[test]
    fn test_pin_beyond_message_range_is_dropped() {
        let wide = PinId::new(0x8000_0000).unwrap();
        assert_eq!(Message::gpio(wide, 1), None);
        assert_eq!(Message::gpio(pin(i32::MAX as u32), 1).map(|m| m.arg1), Some(i32::MAX));

        let mut hw = SimGpio::new();
        hw.latch(PinEvent {
            pin: wide,
            level: PinLevel::High,
        });
        hw.latch(PinEvent {
            pin: pin(7),
            level: PinLevel::Low,
        });

        let queue: EventQueue<HostIrq, 4> = EventQueue::new();
        assert_eq!(capture(&mut hw, &queue), 1);
        assert_eq!(queue.pop(), Message::gpio(pin(7), 0));
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
    }
}
