//! Kestrel Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details.

#![no_std]

/// Trait for access to the x86 16-bit I/O port space.
///
/// Each call is a single `in`/`out` instruction on real hardware and is
/// assumed to complete; there is no failure path. Multi-step protocols built
/// on top (index/data port pairs) are not atomic across calls, so callers
/// that share a port pair must serialize through a lock.
pub trait PortIo {
    /// Writes a byte to `port`.
    fn outb(&mut self, port: u16, value: u8);
    /// Reads a byte from `port`.
    fn inb(&mut self, port: u16) -> u8;
    /// Writes a double word to `port`.
    fn outl(&mut self, port: u16, value: u32);
    /// Reads a double word from `port`.
    fn inl(&mut self, port: u16) -> u32;
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn outb(&mut self, port: u16, value: u8) {
        (**self).outb(port, value);
    }

    fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    fn outl(&mut self, port: u16, value: u32) {
        (**self).outl(port, value);
    }

    fn inl(&mut self, port: u16) -> u32 {
        (**self).inl(port)
    }
}
