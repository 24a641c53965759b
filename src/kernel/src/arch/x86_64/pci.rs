//! PCI configuration space access for x86_64.
//!
//! Owns the single configuration mechanism #1 session (ports 0xCF8/0xCFC)
//! behind a spinlock. The address and data ports are a shared two-step
//! protocol, so every access goes through the lock with interrupts
//! disabled; a handler touching PCI while the lock is held would otherwise
//! deadlock.

use kestrel_common::pci::{PciAddress, PciDevice};
use kestrel_devices::pci::{Command, ConfigSpace, Enumeration};
use spin::Mutex;
use x86_64::instructions::interrupts;

use super::port::X86PortIo;

/// Global configuration space session, lazily initialized.
pub static PCI: spin::Once<Mutex<ConfigSpace<X86PortIo>>> = spin::Once::new();

/// Initializes the global configuration space session.
///
/// Idempotent.
pub fn init() {
    config_space();
}

fn config_space() -> &'static Mutex<ConfigSpace<X86PortIo>> {
    PCI.call_once(|| {
        // SAFETY: The kernel runs in ring 0, and this is the only capability
        // that drives 0xCF8/0xCFC; it is only reachable through the mutex.
        Mutex::new(ConfigSpace::new(unsafe { X86PortIo::new() }))
    })
}

/// Run `f` with exclusive access to configuration space.
pub fn with<R>(f: impl FnOnce(&mut ConfigSpace<X86PortIo>) -> R) -> R {
    interrupts::without_interrupts(|| f(&mut config_space().lock()))
}

/// Enumerate all functions into `out`.
///
/// See [`ConfigSpace::enumerate`]: the total is exact even when `out` is
/// too small, so an empty slice sizes the buffer for a second call.
pub fn enumerate(out: &mut [PciDevice]) -> Enumeration {
    with(|pci| pci.enumerate(out))
}

/// Scan all PCI buses for devices.
///
/// Calls the provided callback for each discovered device, with the
/// configuration space lock held.
pub fn scan<F>(callback: F)
where
    F: FnMut(PciDevice),
{
    with(|pci| pci.scan(callback))
}

/// Find the first function with the given vendor and device IDs.
pub fn find(vendor_id: u16, device_id: u16) -> Option<PciDevice> {
    with(|pci| pci.find(vendor_id, device_id))
}

/// Set `bits` in the command register of the function at `addr`.
pub fn enable(addr: PciAddress, bits: Command) {
    with(|pci| pci.enable(addr, bits))
}
