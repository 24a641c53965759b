//! Shared types for the Kestrel kernel and its device drivers.
//!
//! Everything here is plain data: records produced by the drivers in
//! `kestrel-devices` and the display tables that go with them. Nothing in
//! this crate touches hardware.

#![no_std]
#![warn(missing_docs)]

pub mod error;
pub mod pci;
pub mod time;

pub use error::RtcError;
pub use pci::{Bar, HeaderType, PciAddress, PciDevice};
pub use time::DateTime;
