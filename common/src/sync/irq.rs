use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Implemented per architecture in [`crate::arch`]. Locks that are shared
/// with interrupt handlers use it to keep the handler out while the lock is
/// held by normal code.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);
}
