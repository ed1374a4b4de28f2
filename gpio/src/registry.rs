//! Interrupt callback registry.
//!
//! A fixed table of `N` slots mapping pins to callback handles. Slots are
//! found by pin equality, not by position: the pin space is sparse while
//! the slot count is small. An empty slot has no pin.
//!
//! Invariants:
//! - no pin occupies two slots
//! - an occupied slot owns at most one handle reference, released exactly
//!   once when the slot is cleared or the handle replaced
//! - the table never grows; exhaustion is reported as [`RegistryFull`]

use core::fmt;

use drivers::PinId;

use crate::callback::CallbackHost;

/// One registry slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Slot<T> {
    pin: Option<PinId>,
    callback: Option<T>,
}

impl<T> Slot<T> {
    const EMPTY: Self = Self {
        pin: None,
        callback: None,
    };

    pub fn pin(&self) -> Option<PinId> {
        self.pin
    }

    pub fn callback(&self) -> Option<&T> {
        self.callback.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pin.is_none()
    }
}

/// How a successful registration changed the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A free slot was claimed.
    Claimed { slot: usize },
    /// The pin's previous handle was released and replaced.
    Replaced { slot: usize },
    /// The pin already held this exact handle.
    Unchanged { slot: usize },
}

impl Registration {
    pub fn slot(self) -> usize {
        match self {
            Registration::Claimed { slot }
            | Registration::Replaced { slot }
            | Registration::Unchanged { slot } => slot,
        }
    }
}

/// Every slot is taken by another pin. Carries the rejected handle back so
/// the caller still owns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegistryFull<T>(pub T);

impl<T> fmt::Display for RegistryFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no free interrupt slot")
    }
}

/// Fixed-capacity pin-to-callback table.
pub struct IrqRegistry<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T: Copy + Eq + fmt::Debug, const N: usize> IrqRegistry<T, N> {
    /// All slots empty.
    pub const fn new() -> Self {
        Self {
            slots: [const { Slot::EMPTY }; N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    pub fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    fn position(&self, pin: PinId) -> Option<usize> {
        self.slots.iter().position(|s| s.pin == Some(pin))
    }

    /// Handle registered for `pin`.
    pub fn lookup(&self, pin: PinId) -> Option<T> {
        self.position(pin).and_then(|i| self.slots[i].callback)
    }

    pub fn contains(&self, pin: PinId) -> bool {
        self.position(pin).is_some()
    }

    /// Bind `callback` to `pin`.
    ///
    /// An existing slot for the pin is reused, releasing the handle it held
    /// unless it is the same handle. Otherwise the lowest free slot is
    /// claimed. On [`RegistryFull`] nothing changes.
    pub fn register<C>(
        &mut self,
        pin: PinId,
        callback: T,
        host: &mut C,
    ) -> Result<Registration, RegistryFull<T>>
    where
        C: CallbackHost<Handle = T>,
    {
        if let Some(slot) = self.position(pin) {
            let entry = &mut self.slots[slot];
            return Ok(match entry.callback.replace(callback) {
                Some(old) if old == callback => Registration::Unchanged { slot },
                Some(old) => {
                    host.release(old);
                    log::debug!("irq registry: pin {pin} slot {slot} callback replaced");
                    Registration::Replaced { slot }
                }
                None => Registration::Claimed { slot },
            });
        }

        let Some(slot) = self.slots.iter().position(Slot::is_empty) else {
            return Err(RegistryFull(callback));
        };

        self.slots[slot] = Slot {
            pin: Some(pin),
            callback: Some(callback),
        };
        log::debug!("irq registry: pin {pin} claimed slot {slot}");

        Ok(Registration::Claimed { slot })
    }

    /// Clear the slot of `pin` and release its handle.
    ///
    /// Returns whether the pin was registered; an unknown pin is not an
    /// error.
    pub fn unregister<C>(&mut self, pin: PinId, host: &mut C) -> bool
    where
        C: CallbackHost<Handle = T>,
    {
        let Some(slot) = self.position(pin) else {
            return false;
        };

        let entry = core::mem::replace(&mut self.slots[slot], Slot::EMPTY);
        if let Some(callback) = entry.callback {
            host.release(callback);
        }
        log::debug!("irq registry: pin {pin} released slot {slot}");

        true
    }

    /// Deliver an interrupt for `pin` to its callback.
    ///
    /// Events for pins without a slot are expected (the pin may have been
    /// closed after the event was queued) and are dropped. Returns whether
    /// a callback ran.
    pub fn dispatch<C>(&self, pin: PinId, arg: i32, host: &mut C) -> bool
    where
        C: CallbackHost<Handle = T>,
    {
        match self.lookup(pin) {
            Some(callback) => {
                log::trace!("irq registry: pin {pin} -> {callback:?} ({arg})");
                host.invoke(callback, arg);
                true
            }
            None => {
                log::trace!("irq registry: pin {pin} has no callback, event dropped");
                false
            }
        }
    }

    /// Release every handle and empty the table.
    pub fn clear<C>(&mut self, host: &mut C)
    where
        C: CallbackHost<Handle = T>,
    {
        for slot in self.slots.iter_mut() {
            if let Some(callback) = slot.callback.take() {
                host.release(callback);
            }
            slot.pin = None;
        }
    }
}

impl<T: Copy + Eq + fmt::Debug, const N: usize> Default for IrqRegistry<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IrqRegistry<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .filter_map(|s| s.pin.map(|pin| (pin.get(), &s.callback))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Host that records every invoke and release.
    #[derive(Default)]
    struct Recorder {
        invoked: Vec<(u32, i32)>,
        released: Vec<u32>,
    }

    impl CallbackHost for Recorder {
        type Handle = u32;

        fn invoke(&mut self, handle: u32, arg: i32) {
            self.invoked.push((handle, arg));
        }

        fn release(&mut self, handle: u32) {
            self.released.push(handle);
        }
    }

    fn pin(n: u32) -> PinId {
        PinId::new(n).unwrap()
    }

    #[test]
    fn test_register_claims_lowest_free_slot() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        assert_eq!(
            registry.register(pin(5), 100, &mut host),
            Ok(Registration::Claimed { slot: 0 })
        );
        assert_eq!(
            registry.register(pin(6), 101, &mut host),
            Ok(Registration::Claimed { slot: 1 })
        );
        assert!(registry.unregister(pin(5), &mut host));
        assert_eq!(
            registry.register(pin(7), 102, &mut host),
            Ok(Registration::Claimed { slot: 0 })
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_replace_releases_old_handle_once() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(5), 100, &mut host).unwrap();
        assert_eq!(
            registry.register(pin(5), 200, &mut host),
            Ok(Registration::Replaced { slot: 0 })
        );

        assert_eq!(host.released, [100]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(pin(5)), Some(200));
    }

    #[test]
    fn test_same_handle_is_not_released() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(5), 100, &mut host).unwrap();
        assert_eq!(
            registry.register(pin(5), 100, &mut host),
            Ok(Registration::Unchanged { slot: 0 })
        );
        assert!(host.released.is_empty());
    }

    #[test]
    fn test_existing_pin_wins_over_earlier_free_slot() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(5), 100, &mut host).unwrap();
        registry.register(pin(6), 101, &mut host).unwrap();
        registry.unregister(pin(5), &mut host);

        // Slot 0 is free but pin 6 already lives in slot 1
        assert_eq!(
            registry.register(pin(6), 102, &mut host),
            Ok(Registration::Replaced { slot: 1 })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry
                .slots()
                .iter()
                .filter(|s| s.pin() == Some(pin(6)))
                .count(),
            1
        );
    }

    #[test]
    fn test_full_registry_returns_handle() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 2> = IrqRegistry::new();

        registry.register(pin(1), 10, &mut host).unwrap();
        registry.register(pin(2), 20, &mut host).unwrap();
        assert!(registry.is_full());

        assert_eq!(
            registry.register(pin(3), 30, &mut host),
            Err(RegistryFull(30))
        );
        assert!(!registry.contains(pin(3)));
        assert!(host.released.is_empty());

        // Replacing on an existing pin still works when full
        assert!(registry.register(pin(2), 21, &mut host).is_ok());
        assert_eq!(host.released, [20]);
    }

    #[test]
    fn test_unregister_unknown_pin_is_noop() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 2> = IrqRegistry::new();

        assert!(!registry.unregister(pin(9), &mut host));
        assert!(host.released.is_empty());
    }

    #[test]
    fn test_dispatch_routes_by_pin() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(5), 100, &mut host).unwrap();
        registry.register(pin(6), 200, &mut host).unwrap();

        assert!(registry.dispatch(pin(6), 42, &mut host));
        assert!(!registry.dispatch(pin(7), 1, &mut host));
        assert_eq!(host.invoked, [(200, 42)]);
    }

    #[test]
    fn test_dispatch_after_unregister_is_noop() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(5), 100, &mut host).unwrap();
        registry.unregister(pin(5), &mut host);

        assert!(!registry.dispatch(pin(5), 1, &mut host));
        assert!(host.invoked.is_empty());
        assert_eq!(host.released, [100]);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut host = Recorder::default();
        let mut registry: IrqRegistry<u32, 4> = IrqRegistry::new();

        registry.register(pin(1), 10, &mut host).unwrap();
        registry.register(pin(2), 20, &mut host).unwrap();
        registry.clear(&mut host);

        assert!(registry.is_empty());
        host.released.sort_unstable();
        assert_eq!(host.released, [10, 20]);
    }
}
