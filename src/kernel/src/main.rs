//! Kestrel Kernel Entry Point
//!
//! Boots, reports the PCI topology and the wall-clock time on the serial
//! console, then halts.

#![no_std]
#![no_main]

use bootloader::{entry_point, BootInfo};
use core::panic::PanicInfo;
use kestrel_common::PciDevice;
use kestrel_kernel::arch::x86_64::{self, pci, rtc};
use kestrel_kernel::serial_println;

entry_point!(kernel_main);

/// Devices listed on the console; the total is always reported.
const MAX_LISTED_DEVICES: usize = 64;

/// Kernel entry point.
///
/// Called by the bootloader after setting up the initial environment.
fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    kestrel_kernel::init();
    log::info!("Kestrel v{}", env!("CARGO_PKG_VERSION"));

    report_pci();
    report_time();

    log::info!("Boot complete");
    x86_64::halt_loop()
}

fn report_pci() {
    // Count first, then fill no more than we have room for.
    let needed = pci::enumerate(&mut []).total;
    let mut devices = [PciDevice::default(); MAX_LISTED_DEVICES];
    let scan = pci::enumerate(&mut devices[..needed.min(MAX_LISTED_DEVICES)]);

    if scan.total == 0 {
        log::warn!("No PCI devices found");
        return;
    }

    for dev in &devices[..scan.written] {
        serial_println!("  {}", dev);
    }
    if scan.is_truncated() {
        serial_println!("  ...and {} more devices", scan.total - scan.written);
    }
    serial_println!("  Total devices found: {}", scan.total);
}

fn report_time() {
    match rtc::try_now() {
        Ok(now) => log::info!("RTC: {}", now),
        Err(e) => log::error!("RTC: {}", e),
    }
}

/// Panic handler.
///
/// Called when the kernel encounters an unrecoverable error.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    serial_println!("KERNEL PANIC: {}", info);
    x86_64::halt_loop()
}
