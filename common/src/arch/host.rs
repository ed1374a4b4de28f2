//! Interrupt control for hosted builds (simulation and tests).
//!
//! There is no interrupt context on a host, so masking only tracks nesting
//! depth. The depth is exposed for tests that check critical sections are
//! balanced.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::sync::irq::IrqControl;

static DEPTH: AtomicUsize = AtomicUsize::new(0);

pub struct HostIrq;

impl HostIrq {
    /// Number of currently open critical sections.
    pub fn depth() -> usize {
        DEPTH.load(Ordering::Acquire)
    }
}

impl IrqControl for HostIrq {
    type State = ();

    fn disable() {
        DEPTH.fetch_add(1, Ordering::AcqRel);
    }

    fn restore(_state: ()) {
        DEPTH.fetch_sub(1, Ordering::AcqRel);
    }
}
