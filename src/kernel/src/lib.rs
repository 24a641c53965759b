//! Kestrel Kernel
//!
//! A bare-metal x86_64 kernel that describes the machine it boots on.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `arch`: Platform-specific code (serial, port I/O, PCI and RTC access)
//! - `logger`: `log` backend writing to the serial console
//! - `testutil`: QEMU test harness support
//!
//! The drivers themselves live in `kestrel-devices`; this crate supplies the
//! real port I/O and the global locks around each driver.
//!
//! # Safety
//!
//! This is a `#![no_std]` kernel. All unsafe code is documented with safety
//! invariants explaining why the usage is correct.

#![no_std]
#![warn(missing_docs)]

pub mod arch;
pub mod logger;
pub mod testutil;

/// Initializes core kernel subsystems.
///
/// Called early in the boot process to set up essential services.
pub fn init() {
    #[cfg(target_arch = "x86_64")]
    {
        arch::x86_64::serial::init();
        logger::init();
        arch::x86_64::pci::init();
        arch::x86_64::rtc::init();
    }
}
