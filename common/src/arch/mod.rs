//! Architecture-specific interrupt control.
//!
//! [`CurrentIrq`] names the [`IrqControl`](crate::sync::IrqControl)
//! implementation for the target being built.

pub mod host;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "arm", target_os = "none"))] {
        pub mod arm;
        pub use arm::irq::ArmIrq as CurrentIrq;
    } else {
        pub use host::HostIrq as CurrentIrq;
    }
}
