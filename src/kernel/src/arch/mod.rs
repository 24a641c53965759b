//! Architecture-specific implementations.
//!
//! Port I/O only exists on x86, so this is the only architecture the kernel
//! builds for.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86_64")]
pub use x86_64::{halt_loop, X86PortIo};
