//! BCM2835 Interrupt Controller, GPIO lines only.
//!
//! The GPIO block raises one shared IRQ per register bank. Pin-level
//! demultiplexing happens in [`super::gpio`] by scanning the event status
//! registers.

use core::ptr::write_volatile;

/// Interrupt controller base address.
pub const INT_CONTROLLER_BASE: usize = 0x2000_b000;

/// `gpio_int[0]`, raised for events on lines 0..=31.
pub const IRQ_GPIO_BANK0: u32 = 49;
/// `gpio_int[1]`, raised for events on lines 32..=53.
pub const IRQ_GPIO_BANK1: u32 = 50;

/// Memory-mapped interrupt controller registers.
#[repr(C)]
struct Registers {
    _padding: [u8; 0x200],
    _irq_basic_pend: u32,
    _irq_1_pend: u32,
    _irq_2_pend: u32,
    _fiq_ctrl: u32,
    _enable_irqs_1: u32,
    enable_irqs_2: u32,
}

#[inline(always)]
fn regs() -> *mut Registers {
    INT_CONTROLLER_BASE as *mut Registers
}

/// IRQ line serving a GPIO line.
pub fn gpio_bank_irq(line: u32) -> u32 {
    if line < 32 {
        IRQ_GPIO_BANK0
    } else {
        IRQ_GPIO_BANK1
    }
}

/// Enable (unmask) an interrupt line.
///
/// Only IRQs 32..=63 are handled here; the GPIO bank lines live there.
pub fn enable_irq(irq: u32) {
    if let 32..=63 = irq {
        unsafe {
            write_volatile(&mut (*regs()).enable_irqs_2, 1 << (irq - 32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpio_bank_irq() {
        assert_eq!(gpio_bank_irq(1), IRQ_GPIO_BANK0);
        assert_eq!(gpio_bank_irq(31), IRQ_GPIO_BANK0);
        assert_eq!(gpio_bank_irq(32), IRQ_GPIO_BANK1);
        assert_eq!(gpio_bank_irq(53), IRQ_GPIO_BANK1);
    }
}
