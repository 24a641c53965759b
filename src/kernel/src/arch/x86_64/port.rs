//! Raw x86 port I/O.

use kestrel_hal::PortIo;
use x86_64::instructions::port::Port;

/// [`PortIo`] over the `in`/`out` instructions.
#[derive(Debug)]
pub struct X86PortIo {
    _private: (),
}

impl X86PortIo {
    /// Create a port I/O capability.
    ///
    /// # Safety
    ///
    /// The caller must be running with I/O privilege (ring 0 in this kernel)
    /// and must not let two capabilities drive the same port protocol
    /// without a lock around it.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PortIo for X86PortIo {
    fn outb(&mut self, port: u16, value: u8) {
        // SAFETY: I/O privilege is guaranteed by the constructor contract.
        unsafe { Port::<u8>::new(port).write(value) }
    }

    fn inb(&mut self, port: u16) -> u8 {
        // SAFETY: I/O privilege is guaranteed by the constructor contract.
        unsafe { Port::<u8>::new(port).read() }
    }

    fn outl(&mut self, port: u16, value: u32) {
        // SAFETY: I/O privilege is guaranteed by the constructor contract.
        unsafe { Port::<u32>::new(port).write(value) }
    }

    fn inl(&mut self, port: u16) -> u32 {
        // SAFETY: I/O privilege is guaranteed by the constructor contract.
        unsafe { Port::<u32>::new(port).read() }
    }
}
