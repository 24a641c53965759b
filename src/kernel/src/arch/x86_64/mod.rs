//! x86_64 architecture support.
//!
//! Provides serial port communication and the port I/O backed PCI and RTC
//! drivers for x86_64 platforms.

pub mod pci;
pub mod port;
pub mod rtc;
pub mod serial;

pub use port::X86PortIo;
pub use serial::SERIAL;

/// Halts the CPU until the next interrupt.
///
/// Used in idle loops to reduce power consumption.
#[inline]
pub fn hlt() {
    x86_64::instructions::hlt();
}

/// Halts the CPU in an infinite loop.
///
/// Used after boot completes and after unrecoverable errors (panics).
pub fn halt_loop() -> ! {
    loop {
        hlt();
    }
}
