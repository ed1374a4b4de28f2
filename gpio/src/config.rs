//! Build-time limits and runtime defaults.

use drivers::hal::gpio::{EdgeTrigger, PullMode};

/// Interrupt callback slots in the registry.
pub const IRQ_SLOTS: usize = 16;

/// Events the interrupt handler can queue before the loop drains them.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// Defaults applied when `setup` is called without a pull or edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GpioConfig {
    pub default_pull: PullMode,
    pub default_edge: EdgeTrigger,
}

impl GpioConfig {
    /// Rising-edge default, as described in the scripting API reference.
    ///
    /// Deployed firmware has always armed both edges when no trigger was
    /// given, which is what [`Default`] keeps.
    pub const fn documented() -> Self {
        Self {
            default_pull: PullMode::None,
            default_edge: EdgeTrigger::Rising,
        }
    }

    pub const fn with_default_edge(mut self, edge: EdgeTrigger) -> Self {
        self.default_edge = edge;
        self
    }

    pub const fn with_default_pull(mut self, pull: PullMode) -> Self {
        self.default_pull = pull;
        self
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            default_pull: PullMode::None,
            default_edge: EdgeTrigger::Both,
        }
    }
}
