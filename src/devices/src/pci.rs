//! PCI configuration space access and bus enumeration.
//!
//! Provides port I/O based access to PCI configuration space for device
//! enumeration. Uses the legacy PCI mechanism (ports 0xCF8/0xCFC).
//!
//! # References
//!
//! - PCI Local Bus Specification, Section 3.2.2.3.2 "Configuration Mechanism #1"

use core::iter::FusedIterator;

use bitflags::bitflags;
use kestrel_common::pci::{PciAddress, PciDevice, BAR_COUNT, PCI_VENDOR_ID_NONE};
use kestrel_hal::PortIo;

pub use kestrel_common::pci::{class_name, vendor_name};

/// PCI configuration address port (0xCF8).
const PCI_CONFIG_ADDRESS: u16 = 0x0CF8;

/// PCI configuration data port (0xCFC).
const PCI_CONFIG_DATA: u16 = 0x0CFC;

/// Enable bit of CONFIG_ADDRESS.
const CONFIG_ENABLE: u32 = 1 << 31;

/// Number of buses addressable through mechanism #1.
pub const MAX_BUS: u16 = 256;

/// Device slots per bus.
pub const DEVICES_PER_BUS: u8 = 32;

/// Functions per device.
pub const FUNCTIONS_PER_DEVICE: u8 = 8;

/// PCI configuration space register offsets.
pub mod reg {
    /// Vendor ID (16-bit).
    pub const VENDOR_ID: u8 = 0x00;
    /// Device ID (16-bit).
    pub const DEVICE_ID: u8 = 0x02;
    /// Command register (16-bit).
    pub const COMMAND: u8 = 0x04;
    /// Status register (16-bit).
    pub const STATUS: u8 = 0x06;
    /// Revision ID (8-bit).
    pub const REVISION_ID: u8 = 0x08;
    /// Programming interface (8-bit).
    pub const PROG_IF: u8 = 0x09;
    /// Subclass (8-bit).
    pub const SUBCLASS: u8 = 0x0A;
    /// Base class code (8-bit).
    pub const CLASS_CODE: u8 = 0x0B;
    /// Header type (8-bit).
    pub const HEADER_TYPE: u8 = 0x0E;
    /// Base Address Register 0, the other five follow at 4-byte strides.
    pub const BAR0: u8 = 0x10;
    /// Interrupt line (8-bit).
    pub const INTERRUPT_LINE: u8 = 0x3C;
    /// Interrupt pin (8-bit).
    pub const INTERRUPT_PIN: u8 = 0x3D;
}

bitflags! {
    /// PCI command register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Command: u16 {
        /// Respond to I/O space accesses.
        const IO_SPACE = 1 << 0;
        /// Respond to memory space accesses.
        const MEM_SPACE = 1 << 1;
        /// Allow the function to master the bus (DMA).
        const BUS_MASTER = 1 << 2;
        /// Disable INTx assertion.
        const INTERRUPT_DISABLE = 1 << 10;
    }
}

/// Build the 32-bit CONFIG_ADDRESS value for a given register offset.
///
/// Device and function are masked to their field widths, and the offset is
/// forced to a 4-byte boundary.
pub const fn config_address(addr: PciAddress, offset: u8) -> u32 {
    let bus32 = addr.bus as u32;
    let dev32 = (addr.device & 0x1F) as u32;
    let func32 = (addr.function & 0x07) as u32;
    let off32 = (offset & 0xFC) as u32;

    // Bit 31: Enable bit
    // Bits 23-16: Bus number
    // Bits 15-11: Device number
    // Bits 10-8: Function number
    // Bits 7-0: Register offset (low 2 bits always 0)
    CONFIG_ENABLE | (bus32 << 16) | (dev32 << 11) | (func32 << 8) | off32
}

/// Result of [`ConfigSpace::enumerate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    /// Number of functions present on the machine.
    pub total: usize,
    /// Number of records written into the caller's buffer.
    pub written: usize,
}

impl Enumeration {
    /// Whether the buffer was too small to hold every record.
    pub fn is_truncated(&self) -> bool {
        self.written < self.total
    }
}

/// An exclusive session on the configuration mechanism #1 port pair.
///
/// Each access writes CONFIG_ADDRESS and then touches CONFIG_DATA under the
/// same `&mut self` borrow, so the two steps cannot interleave with another
/// access through this session.
pub struct ConfigSpace<P> {
    io: P,
}

impl<P: PortIo> ConfigSpace<P> {
    /// Create a session over the given port capability.
    pub const fn new(io: P) -> Self {
        Self { io }
    }

    /// Give back the port capability.
    pub fn into_inner(self) -> P {
        self.io
    }

    /// Read a 32-bit value from PCI configuration space.
    pub fn read_u32(&mut self, addr: PciAddress, offset: u8) -> u32 {
        self.io.outl(PCI_CONFIG_ADDRESS, config_address(addr, offset));
        self.io.inl(PCI_CONFIG_DATA)
    }

    /// Read a 16-bit value from PCI configuration space.
    ///
    /// Always an aligned 32-bit access; the half is selected by bit 1 of
    /// `offset`.
    pub fn read_u16(&mut self, addr: PciAddress, offset: u8) -> u16 {
        let dword = self.read_u32(addr, offset & 0xFC);
        let shift = ((offset & 2) * 8) as u32;
        ((dword >> shift) & 0xFFFF) as u16
    }

    /// Read an 8-bit value from PCI configuration space.
    pub fn read_u8(&mut self, addr: PciAddress, offset: u8) -> u8 {
        let dword = self.read_u32(addr, offset & 0xFC);
        let shift = ((offset & 3) * 8) as u32;
        ((dword >> shift) & 0xFF) as u8
    }

    /// Write a 32-bit value to PCI configuration space.
    ///
    /// This replaces the whole register. Updating a narrower field means
    /// reading the register first and merging.
    pub fn write_u32(&mut self, addr: PciAddress, offset: u8, value: u32) {
        self.io.outl(PCI_CONFIG_ADDRESS, config_address(addr, offset));
        self.io.outl(PCI_CONFIG_DATA, value);
    }

    /// Write a 16-bit value to PCI configuration space.
    ///
    /// Reads the aligned dword, replaces the half selected by bit 1 of
    /// `offset` and writes the dword back.
    pub fn write_u16(&mut self, addr: PciAddress, offset: u8, value: u16) {
        let aligned = offset & 0xFC;
        let shift = ((offset & 2) * 8) as u32;

        let mut dword = self.read_u32(addr, aligned);
        dword &= !(0xFFFF << shift);
        dword |= (value as u32) << shift;
        self.write_u32(addr, aligned, dword);
    }

    /// Read the command register.
    pub fn command(&mut self, addr: PciAddress) -> Command {
        Command::from_bits_retain(self.read_u16(addr, reg::COMMAND))
    }

    /// Read the status register.
    pub fn status(&mut self, addr: PciAddress) -> u16 {
        self.read_u16(addr, reg::STATUS)
    }

    /// Set `bits` in the command register, keeping the bits already set.
    pub fn enable(&mut self, addr: PciAddress, bits: Command) {
        let current = self.command(addr);
        let new_cmd = current | bits;
        if new_cmd != current {
            log::debug!(
                "pci: {} command {:#06x} -> {:#06x}",
                addr,
                current.bits(),
                new_cmd.bits()
            );
            self.write_u16(addr, reg::COMMAND, new_cmd.bits());
        }
    }

    /// Whether a function responds at `addr`.
    pub fn device_exists(&mut self, addr: PciAddress) -> bool {
        self.read_u16(addr, reg::VENDOR_ID) != PCI_VENDOR_ID_NONE
    }

    /// Read device information from a PCI address.
    ///
    /// Returns `None` if no device is present at this address.
    pub fn read_device(&mut self, addr: PciAddress) -> Option<PciDevice> {
        if !self.device_exists(addr) {
            return None;
        }

        let mut dev = PciDevice {
            addr,
            vendor_id: self.read_u16(addr, reg::VENDOR_ID),
            device_id: self.read_u16(addr, reg::DEVICE_ID),
            class_code: self.read_u8(addr, reg::CLASS_CODE),
            subclass: self.read_u8(addr, reg::SUBCLASS),
            prog_if: self.read_u8(addr, reg::PROG_IF),
            revision: self.read_u8(addr, reg::REVISION_ID),
            header_type: self.read_u8(addr, reg::HEADER_TYPE),
            interrupt_line: self.read_u8(addr, reg::INTERRUPT_LINE),
            interrupt_pin: self.read_u8(addr, reg::INTERRUPT_PIN),
            bars: [0; BAR_COUNT],
        };
        for (i, bar) in dev.bars.iter_mut().enumerate() {
            *bar = self.read_u32(addr, reg::BAR0 + (i as u8) * 4);
        }
        Some(dev)
    }

    /// Walk every bus, yielding present functions in ascending address order.
    pub fn devices(&mut self) -> Devices<'_, P> {
        Devices {
            space: self,
            bus: 0,
            device: 0,
            function: 0,
            multifunction: false,
        }
    }

    /// Scan all PCI buses for devices.
    ///
    /// Calls the provided callback for each discovered device.
    pub fn scan<F>(&mut self, mut callback: F)
    where
        F: FnMut(PciDevice),
    {
        for dev in self.devices() {
            callback(dev);
        }
    }

    /// Enumerate into a caller-provided buffer.
    ///
    /// The returned `total` always counts every present function, while at
    /// most `out.len()` records are stored. An empty buffer turns this into
    /// a pure count query, which callers use to size storage before a
    /// second pass.
    pub fn enumerate(&mut self, out: &mut [PciDevice]) -> Enumeration {
        let mut total = 0;
        for dev in self.devices() {
            if let Some(slot) = out.get_mut(total) {
                *slot = dev;
            }
            total += 1;
        }

        let result = Enumeration {
            total,
            written: total.min(out.len()),
        };
        log::info!(
            "pci: {} functions found, {} recorded",
            result.total,
            result.written
        );
        result
    }

    /// Find the first function with the given vendor and device IDs.
    pub fn find(&mut self, vendor_id: u16, device_id: u16) -> Option<PciDevice> {
        self.devices()
            .find(|dev| dev.vendor_id == vendor_id && dev.device_id == device_id)
    }
}

/// Lazy bus walk returned by [`ConfigSpace::devices`].
///
/// Function 0 of every slot is probed; functions 1-7 only when function 0
/// exists and its header type carries the multi-function flag.
pub struct Devices<'a, P> {
    space: &'a mut ConfigSpace<P>,
    bus: u16,
    device: u8,
    function: u8,
    multifunction: bool,
}

impl<P> Devices<'_, P> {
    fn advance(&mut self) {
        if self.multifunction && self.function + 1 < FUNCTIONS_PER_DEVICE {
            self.function += 1;
            return;
        }

        self.function = 0;
        self.multifunction = false;
        self.device += 1;
        if self.device == DEVICES_PER_BUS {
            self.device = 0;
            self.bus += 1;
        }
    }
}

impl<P: PortIo> Iterator for Devices<'_, P> {
    type Item = PciDevice;

    fn next(&mut self) -> Option<PciDevice> {
        while self.bus < MAX_BUS {
            let addr = PciAddress::new(self.bus as u8, self.device, self.function);
            let found = self.space.read_device(addr);
            if self.function == 0 {
                self.multifunction = found.is_some_and(|dev| dev.is_multifunction());
            }
            self.advance();

            if let Some(dev) = found {
                log::debug!("pci: {}", dev);
                return Some(dev);
            }
        }
        None
    }
}

impl<P: PortIo> FusedIterator for Devices<'_, P> {}
