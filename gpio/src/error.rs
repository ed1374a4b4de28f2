use thiserror::Error;

/// Errors surfaced by the pin façade.
///
/// `close` never reports an error; everything it hits is logged instead.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// Reserved identifier `0`, or a pin the controller does not have.
    /// No hardware call was made.
    #[error("invalid pin {0}")]
    InvalidPin(u32),
    /// The controller rejected the requested pin configuration.
    #[error("hardware rejected pin configuration")]
    HardwareConfig,
    /// A read or write on a configured pin failed.
    #[error("hardware access failed")]
    Hardware,
    /// All interrupt slots are taken; the pin was returned to idle.
    #[error("interrupt registry full ({capacity} slots)")]
    RegistryFull { capacity: usize },
    #[error("gpio subsystem not initialized")]
    NotInitialized,
    #[error("gpio subsystem already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = core::result::Result<T, GpioError>;
