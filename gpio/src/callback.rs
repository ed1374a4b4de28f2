//! Callback ownership.
//!
//! Callbacks belong to a host (a script runtime, or [`ClosureHost`] for
//! native code). The registry only holds handles. A handle passed to
//! `setup` transfers one reference to the GPIO subsystem, which gives it
//! back through [`CallbackHost::release`] exactly once: when the slot is
//! cleared, when the handle is replaced, or when `setup` fails.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Owner of the callback objects behind registry handles.
pub trait CallbackHost {
    /// Opaque reference to one callback.
    type Handle: Copy + Eq + fmt::Debug;

    /// Run the callback with one argument. Any result is discarded.
    fn invoke(&mut self, handle: Self::Handle, arg: i32);

    /// Drop the reference held by the GPIO subsystem.
    fn release(&mut self, handle: Self::Handle);
}

/// Boxed native callback.
pub type Callback = Box<dyn FnMut(i32) + Send>;

/// Handle into a [`ClosureHost`].
///
/// Carries the slot generation, so a handle that outlived its release
/// never reaches the closure that later reuses the slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CallbackRef {
    index: usize,
    generation: u32,
}

enum State {
    Vacant,
    Idle(Callback),
    /// Closure taken out with [`ClosureHost::take`] and not yet returned.
    Running,
}

struct Entry {
    generation: u32,
    state: State,
}

/// Callback host owning native closures.
pub struct ClosureHost {
    entries: Vec<Entry>,
    free: Vec<usize>,
    live: usize,
}

impl ClosureHost {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Take ownership of `callback` and hand out a reference to it.
    pub fn retain<F>(&mut self, callback: F) -> CallbackRef
    where
        F: FnMut(i32) + Send + 'static,
    {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index];
            entry.state = State::Idle(Box::new(callback));
            return CallbackRef {
                index,
                generation: entry.generation,
            };
        }

        let index = self.entries.len();
        self.entries.push(Entry {
            generation: 0,
            state: State::Idle(Box::new(callback)),
        });
        CallbackRef {
            index,
            generation: 0,
        }
    }

    /// Number of callbacks currently retained.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Whether `handle` still refers to a retained closure.
    pub fn is_live(&self, handle: CallbackRef) -> bool {
        self.entries.get(handle.index).is_some_and(|e| {
            e.generation == handle.generation && !matches!(e.state, State::Vacant)
        })
    }

    /// Borrow the closure out of the host so it can run without the host.
    ///
    /// Returns `None` for stale handles and for a closure that is already
    /// out. The closure must come back through [`put_back`](Self::put_back).
    pub fn take(&mut self, handle: CallbackRef) -> Option<Callback> {
        let entry = self
            .entries
            .get_mut(handle.index)
            .filter(|e| e.generation == handle.generation)?;

        match core::mem::replace(&mut entry.state, State::Running) {
            State::Idle(callback) => Some(callback),
            other => {
                entry.state = other;
                None
            }
        }
    }

    /// Return a closure obtained from [`take`](Self::take).
    ///
    /// If the handle was released while the closure was out, the closure
    /// is dropped here instead.
    pub fn put_back(&mut self, handle: CallbackRef, callback: Callback) {
        match self
            .entries
            .get_mut(handle.index)
            .filter(|e| e.generation == handle.generation)
        {
            Some(entry) if matches!(entry.state, State::Running) => {
                entry.state = State::Idle(callback);
            }
            _ => log::trace!("closure host: {handle:?} released while running, dropped"),
        }
    }
}

impl Default for ClosureHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClosureHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureHost")
            .field("live", &self.live)
            .field("slots", &self.entries.len())
            .finish()
    }
}

impl CallbackHost for ClosureHost {
    type Handle = CallbackRef;

    fn invoke(&mut self, handle: CallbackRef, arg: i32) {
        match self.take(handle) {
            Some(mut callback) => {
                callback(arg);
                self.put_back(handle, callback);
            }
            None => log::trace!("closure host: stale handle {handle:?} not invoked"),
        }
    }

    fn release(&mut self, handle: CallbackRef) {
        let Some(entry) = self
            .entries
            .get_mut(handle.index)
            .filter(|e| e.generation == handle.generation)
        else {
            return;
        };

        if !matches!(entry.state, State::Vacant) {
            // A running closure is dropped by `put_back`
            entry.state = State::Vacant;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(handle.index);
            self.live -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_invoke_passes_argument() {
        let seen = Arc::new(AtomicI32::new(0));
        let mut host = ClosureHost::new();
        let s = seen.clone();
        let handle = host.retain(move |arg| {
            s.store(arg, Ordering::SeqCst);
        });

        host.invoke(handle, 42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(host.live(), 1);
    }

    #[test]
    fn test_release_drops_closure_once() {
        let token = Arc::new(());
        let mut host = ClosureHost::new();
        let t = token.clone();
        let handle = host.retain(move |_| {
            let _ = &t;
        });
        assert_eq!(Arc::strong_count(&token), 2);

        host.release(handle);
        assert_eq!(Arc::strong_count(&token), 1);
        assert_eq!(host.live(), 0);

        // Second release of the same handle is ignored
        host.release(handle);
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn test_stale_handle_does_not_reach_reused_slot() {
        let hits = Arc::new(AtomicI32::new(0));
        let mut host = ClosureHost::new();

        let old = host.retain(|_| {});
        host.release(old);

        let h = hits.clone();
        let new = host.retain(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_ne!(old, new);
        assert!(!host.is_live(old));
        assert!(host.is_live(new));

        host.invoke(old, 1);
        host.release(old);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(host.is_live(new));

        host.invoke(new, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_taken_closure_runs_outside_host() {
        let seen = Arc::new(AtomicI32::new(0));
        let mut host = ClosureHost::new();
        let s = seen.clone();
        let handle = host.retain(move |arg| {
            s.fetch_add(arg, Ordering::SeqCst);
        });

        let mut callback = host.take(handle).unwrap();
        assert!(host.is_live(handle));
        // Already out: neither a second take nor invoke reaches it
        assert!(host.take(handle).is_none());
        host.invoke(handle, 100);

        callback(5);
        host.put_back(handle, callback);
        host.invoke(handle, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 6);
        assert_eq!(host.live(), 1);
    }

    #[test]
    fn test_release_while_running_drops_on_return() {
        let token = Arc::new(());
        let mut host = ClosureHost::new();
        let t = token.clone();
        let handle = host.retain(move |_| {
            let _ = &t;
        });

        let callback = host.take(handle).unwrap();
        host.release(handle);
        assert_eq!(host.live(), 0);
        assert!(!host.is_live(handle));

        // The freed slot is reused before the closure comes back
        let next = host.retain(|_| {});
        assert_eq!(Arc::strong_count(&token), 2);
        host.put_back(handle, callback);
        assert_eq!(Arc::strong_count(&token), 1);

        assert!(host.is_live(next));
        assert!(host.take(next).is_some());
    }
}
