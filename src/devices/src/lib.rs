//! Port I/O device drivers for Kestrel.
//!
//! - [`pci`]: legacy configuration mechanism #1 (ports 0xCF8/0xCFC) and
//!   bus enumeration
//! - [`rtc`]: CMOS real-time clock (ports 0x70/0x71)
//!
//! Both drivers are generic over [`kestrel_hal::PortIo`] and own their port
//! capability, so every multi-step register protocol runs under a single
//! `&mut self` borrow. Sharing a driver between execution contexts is the
//! caller's job (the kernel wraps each one in a spinlock).

#![no_std]
#![warn(missing_docs)]

pub mod pci;
pub mod rtc;

#[cfg(test)]
mod sim;

pub use pci::{Command, ConfigSpace, Devices, Enumeration};
pub use rtc::Rtc;
