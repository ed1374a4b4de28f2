//! BCM2835 GPIO Controller Driver
//!
//! This module provides both raw hardware access and the HAL implementation
//! for the BCM2835 GPIO controller.
//!
//! GPIO0 is not addressable through the HAL because pin identifier `0` is
//! reserved; the valid identifiers are 1..=53.

use super::interrupt;
use crate::hal::gpio::{
    Direction, EdgeTrigger, GpioEvents, GpioHal, PinConfig, PinEvent, PinId, PinLevel, PullMode,
};
use bitflags::bitflags;
use core::ptr::{read_volatile, write_volatile};

/// GPIO base address.
pub const GPIO_BASE: usize = 0x2020_0000;

/// Highest GPIO line on the BCM2835.
pub const MAX_PIN: u32 = 53;

/// GPIO function selection.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
}

/// Internal pull resistor configuration.
#[repr(u32)]
#[derive(Copy, Clone, Debug)]
pub enum Pull {
    Off = 0b00,
    Down = 0b01,
    Up = 0b10,
}

impl From<PullMode> for Pull {
    fn from(mode: PullMode) -> Self {
        match mode {
            PullMode::None => Pull::Off,
            PullMode::Up => Pull::Up,
            PullMode::Down => Pull::Down,
        }
    }
}

bitflags! {
    /// Event detect enable registers for one pin.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct EventDetect: u8 {
        const RISING = 1 << 0;
        const FALLING = 1 << 1;
        const HIGH = 1 << 2;
        const LOW = 1 << 3;
        const ASYNC_RISING = 1 << 4;
        const ASYNC_FALLING = 1 << 5;
    }
}

impl From<EdgeTrigger> for EventDetect {
    fn from(edge: EdgeTrigger) -> Self {
        match edge {
            EdgeTrigger::Rising => EventDetect::RISING,
            EdgeTrigger::Falling => EventDetect::FALLING,
            EdgeTrigger::Both => EventDetect::RISING | EventDetect::FALLING,
        }
    }
}

/// Memory-mapped register layout.
#[repr(C)]
struct Registers {
    gpfsel: [u32; 6],
    _r0: u32,
    gpset: [u32; 2],
    _r1: u32,
    gpclr: [u32; 2],
    _r2: u32,
    gplev: [u32; 2],
    _r3: u32,
    gped: [u32; 2],
    _r4: u32,
    gpren: [u32; 2],
    _r5: u32,
    gpfen: [u32; 2],
    _r6: u32,
    gphen: [u32; 2],
    _r7: u32,
    gplen: [u32; 2],
    _r8: u32,
    gparen: [u32; 2],
    _r9: u32,
    gpafen: [u32; 2],
    _r10: u32,
    gppud: u32,
    gppudclk: [u32; 2],
}

#[inline(always)]
fn regs() -> *mut Registers {
    GPIO_BASE as *mut Registers
}

fn check_pin(pin: PinId) -> Result<u32, Bcm2835Error> {
    match pin.get() {
        line @ 1..=MAX_PIN => Ok(line),
        _ => Err(Bcm2835Error::InvalidPin),
    }
}

fn pin_reg_and_bit(line: u32) -> (usize, u32) {
    let reg = (line / 32) as usize;
    let bit = 1u32 << (line % 32);
    (reg, bit)
}

fn delay_cycles(mut count: u32) {
    while count != 0 {
        unsafe { core::arch::asm!("nop") };
        count -= 1;
    }
}

// ============================================================================
// Raw Hardware Functions
// ============================================================================

/// Set the function of a GPIO line.
pub fn set_function(line: u32, func: Function) {
    let reg = (line / 10) as usize;
    let shift = (line % 10) * 3;
    let mask = 0b111 << shift;

    unsafe {
        let fsel = &mut (*regs()).gpfsel[reg];
        let val = read_volatile(fsel);
        let val = (val & !mask) | ((func as u32) << shift);
        write_volatile(fsel, val);
    }
}

/// Drive a GPIO line high or low.
pub fn write_level(line: u32, level: PinLevel) {
    let (reg, bit) = pin_reg_and_bit(line);

    unsafe {
        match level {
            PinLevel::High => write_volatile(&mut (*regs()).gpset[reg], bit),
            PinLevel::Low => write_volatile(&mut (*regs()).gpclr[reg], bit),
        }
    }
}

/// Read the current logic level of a line.
pub fn level(line: u32) -> PinLevel {
    let reg = (line / 32) as usize;

    unsafe { PinLevel::from_bit(read_volatile(&(*regs()).gplev[reg]) >> (line % 32)) }
}

/// Configure the internal pull resistor.
///
/// Follows the required programming sequence:
/// 1. Write the desired pull state to `GPPUD`.
/// 2. Wait for the control signal to settle.
/// 3. Clock the setting into the target line via `GPPUDCLK`.
/// 4. Clear both registers.
pub fn set_pull(line: u32, pull: Pull) {
    let (reg, bit) = pin_reg_and_bit(line);

    unsafe {
        let gppud = &mut (*regs()).gppud;
        let clk = &mut (*regs()).gppudclk[reg];

        write_volatile(gppud, pull as u32);
        delay_cycles(150);

        write_volatile(clk, bit);
        delay_cycles(150);

        write_volatile(gppud, 0);
        write_volatile(clk, 0);
    }
}

/// Pending event bits for one register bank.
pub fn event_status(reg: usize) -> u32 {
    unsafe { read_volatile(&(*regs()).gped[reg]) }
}

/// Clear a pending event (write-one-to-clear).
pub fn clear_event(line: u32) {
    let (reg, bit) = pin_reg_and_bit(line);

    unsafe {
        write_volatile(&mut (*regs()).gped[reg], bit);
    }
}

/// Enable or disable every detector in `events` for a line.
pub fn configure_event_detect(line: u32, events: EventDetect, enable: bool) {
    let (reg, bit) = pin_reg_and_bit(line);

    for event in events.iter() {
        unsafe {
            let r = &mut *regs();
            let reg_ptr = if event == EventDetect::RISING {
                &mut r.gpren[reg]
            } else if event == EventDetect::FALLING {
                &mut r.gpfen[reg]
            } else if event == EventDetect::HIGH {
                &mut r.gphen[reg]
            } else if event == EventDetect::LOW {
                &mut r.gplen[reg]
            } else if event == EventDetect::ASYNC_RISING {
                &mut r.gparen[reg]
            } else {
                &mut r.gpafen[reg]
            };

            let mut val = read_volatile(reg_ptr);

            if enable {
                val |= bit;
            } else {
                val &= !bit;
            }

            write_volatile(reg_ptr, val);
        }
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

/// BCM2835 GPIO controller.
#[derive(Debug)]
pub struct Bcm2835Gpio;

impl Bcm2835Gpio {
    /// Create a new GPIO controller.
    ///
    /// # Safety
    ///
    /// GPIO registers must be properly mapped.
    pub const unsafe fn new() -> Self {
        Self
    }
}

impl GpioHal for Bcm2835Gpio {
    type Error = Bcm2835Error;

    fn is_valid_pin(&self, pin: PinId) -> bool {
        check_pin(pin).is_ok()
    }

    fn configure(&mut self, pin: PinId, config: PinConfig) -> Result<(), Self::Error> {
        let line = check_pin(pin)?;

        // Stop edge detection before changing function so no stale event
        // is latched while the pin is being reprogrammed.
        configure_event_detect(line, EventDetect::all(), false);
        clear_event(line);

        match config.direction {
            Direction::Output => set_function(line, Function::Output),
            Direction::Input | Direction::Interrupt => set_function(line, Function::Input),
        }
        set_pull(line, config.pull.into());

        if config.direction == Direction::Interrupt {
            configure_event_detect(line, config.edge.into(), true);
            let irq = interrupt::gpio_bank_irq(line);
            interrupt::enable_irq(irq);
            log::debug!("bcm2835: gpio {line} edge {:?} on irq {irq}", config.edge);
        }

        Ok(())
    }

    fn deconfigure(&mut self, pin: PinId) -> Result<(), Self::Error> {
        let line = check_pin(pin)?;

        configure_event_detect(line, EventDetect::all(), false);
        clear_event(line);
        set_function(line, Function::Input);
        set_pull(line, Pull::Off);

        Ok(())
    }

    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        Ok(level(check_pin(pin)?))
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error> {
        write_level(check_pin(pin)?, level);
        Ok(())
    }
}

impl GpioEvents for Bcm2835Gpio {
    fn next_event(&mut self) -> Option<PinEvent> {
        for reg in 0..2 {
            let mut pending = event_status(reg);

            while pending != 0 {
                let line = reg as u32 * 32 + pending.trailing_zeros();
                pending &= pending - 1;
                clear_event(line);

                // GPIO0 has no identifier; its events are discarded
                if let Some(pin) = PinId::new(line).filter(|_| line <= MAX_PIN) {
                    return Some(PinEvent {
                        pin,
                        level: level(line),
                    });
                }
            }
        }

        None
    }
}

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bcm2835Error {
    InvalidPin,
}
