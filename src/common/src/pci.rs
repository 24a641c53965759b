//! PCI device descriptors.
//!
//! These are the records produced by bus enumeration. The configuration
//! space access itself lives in `kestrel-devices`.

use bitflags::bitflags;
use core::fmt;

/// PCI vendor ID indicating "no device present".
pub const PCI_VENDOR_ID_NONE: u16 = 0xFFFF;

/// Number of Base Address Registers in a type 0 header.
pub const BAR_COUNT: usize = 6;

/// A PCI function address (bus, device, function).
///
/// Ordering is lexicographic over (bus, device, function), which is also the
/// order enumeration produces devices in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PciAddress {
    /// Bus number (0-255).
    pub bus: u8,
    /// Device number (0-31).
    pub device: u8,
    /// Function number (0-7).
    pub function: u8,
}

impl PciAddress {
    /// Create a new PCI address.
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:02X}.{}", self.bus, self.device, self.function)
    }
}

bitflags! {
    /// Header type register (offset 0x0E).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct HeaderType: u8 {
        /// Device implements functions 1-7 in addition to function 0.
        const MULTI_FUNCTION = 1 << 7;
    }
}

/// A decoded Base Address Register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bar {
    /// Register reads as zero.
    Unused,
    /// I/O space window.
    Io {
        /// Base port (low 2 bits cleared).
        port: u32,
    },
    /// 32-bit memory window (also used for the legacy below-1MiB type).
    Memory32 {
        /// Base address (low 4 bits cleared).
        base: u32,
        /// Reads have no side effects.
        prefetchable: bool,
    },
    /// 64-bit memory window spanning this BAR and the next one.
    Memory64 {
        /// Base address (low 4 bits cleared).
        base: u64,
        /// Reads have no side effects.
        prefetchable: bool,
    },
}

/// Information about a discovered PCI function.
///
/// A record is only ever built for a present function, so `vendor_id` is
/// never [`PCI_VENDOR_ID_NONE`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PciDevice {
    /// PCI address (bus/device/function).
    pub addr: PciAddress,
    /// Vendor ID.
    pub vendor_id: u16,
    /// Device ID.
    pub device_id: u16,
    /// Base class code.
    pub class_code: u8,
    /// Subclass code.
    pub subclass: u8,
    /// Programming interface.
    pub prog_if: u8,
    /// Revision ID.
    pub revision: u8,
    /// Raw header type byte, bit 7 is the multi-function flag.
    pub header_type: u8,
    /// Interrupt line.
    pub interrupt_line: u8,
    /// Interrupt pin (0 = none, 1-4 = INTA#-INTD#).
    pub interrupt_pin: u8,
    /// Raw Base Address Register values.
    pub bars: [u32; BAR_COUNT],
}

impl PciDevice {
    /// Header type flags.
    pub fn header_flags(&self) -> HeaderType {
        HeaderType::from_bits_truncate(self.header_type)
    }

    /// Header layout (bits 6:0 of the header type, 0 = general device).
    pub fn header_layout(&self) -> u8 {
        self.header_type & !HeaderType::MULTI_FUNCTION.bits()
    }

    /// Whether this function's device exposes functions 1-7.
    pub fn is_multifunction(&self) -> bool {
        self.header_flags().contains(HeaderType::MULTI_FUNCTION)
    }

    /// Human-readable base class name.
    pub fn class_name(&self) -> &'static str {
        class_name(self.class_code)
    }

    /// Human-readable vendor name.
    pub fn vendor_name(&self) -> &'static str {
        vendor_name(self.vendor_id)
    }

    /// Decode BAR `index`.
    ///
    /// Returns `None` for an index past the last BAR, for the reserved
    /// memory type, and for a 64-bit BAR in the last slot (its upper half
    /// would be missing). The upper half of a 64-bit pair is not recognised
    /// as such when decoded on its own.
    pub fn bar(&self, index: usize) -> Option<Bar> {
        let raw = *self.bars.get(index)?;
        if raw == 0 {
            return Some(Bar::Unused);
        }

        // Bit 0 = 1 means I/O space
        if (raw & 1) != 0 {
            return Some(Bar::Io {
                port: raw & 0xFFFF_FFFC,
            });
        }

        let prefetchable = (raw & (1 << 3)) != 0;
        let base = raw & 0xFFFF_FFF0;

        // Bits 2:1 indicate type:
        // 00 = 32-bit
        // 01 = below 1MiB (legacy)
        // 10 = 64-bit
        match (raw >> 1) & 0x3 {
            0b00 | 0b01 => Some(Bar::Memory32 { base, prefetchable }),
            0b10 => {
                let high = *self.bars.get(index + 1)? as u64;
                Some(Bar::Memory64 {
                    base: (high << 32) | base as u64,
                    prefetchable,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for PciDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:04X}:{:04X} {} - {}",
            self.addr,
            self.vendor_id,
            self.device_id,
            self.vendor_name(),
            self.class_name()
        )
    }
}

/// Human-readable name for a PCI base class code.
///
/// Unmapped codes return `"Unknown"`.
pub fn class_name(class_code: u8) -> &'static str {
    match class_code {
        0x00 => "Unclassified",
        0x01 => "Mass Storage Controller",
        0x02 => "Network Controller",
        0x03 => "Display Controller",
        0x04 => "Multimedia Controller",
        0x05 => "Memory Controller",
        0x06 => "Bridge Device",
        0x07 => "Simple Communication Controller",
        0x08 => "Base System Peripheral",
        0x09 => "Input Device Controller",
        0x0A => "Docking Station",
        0x0B => "Processor",
        0x0C => "Serial Bus Controller",
        0x0D => "Wireless Controller",
        0x0E => "Intelligent Controller",
        0x0F => "Satellite Communication Controller",
        0x10 => "Encryption Controller",
        0x11 => "Signal Processing Controller",
        _ => "Unknown",
    }
}

/// Human-readable name for common PCI vendors.
///
/// Unmapped IDs return `"Unknown"`.
pub fn vendor_name(vendor_id: u16) -> &'static str {
    match vendor_id {
        0x8086 => "Intel",
        0x1022 => "AMD",
        0x10DE => "NVIDIA",
        0x1002 => "ATI/AMD",
        0x1234 => "QEMU",
        0x15AD => "VMware",
        0x80EE => "VirtualBox",
        0x1AF4 => "VirtIO",
        0x10EC => "Realtek",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    fn e1000() -> PciDevice {
        PciDevice {
            addr: PciAddress::new(0, 3, 0),
            vendor_id: 0x8086,
            device_id: 0x100E,
            class_code: 0x02,
            header_type: 0x00,
            bars: [0xFEBC_0000, 0x0000_C001, 0, 0, 0, 0],
            ..PciDevice::default()
        }
    }

    #[test]
    fn test_address_ordering() {
        let a = PciAddress::new(0, 31, 7);
        let b = PciAddress::new(1, 0, 0);
        let c = PciAddress::new(1, 0, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", e1000()),
            "[00:03.0] 8086:100E Intel - Network Controller"
        );
        assert_eq!(format!("{}", PciAddress::new(0x1A, 0x1F, 7)), "1A:1F.7");
    }

    #[test]
    fn test_name_fallbacks() {
        assert_eq!(class_name(0x06), "Bridge Device");
        assert_eq!(class_name(0x11), "Signal Processing Controller");
        assert_eq!(class_name(0x12), "Unknown");
        assert_eq!(class_name(0xFF), "Unknown");
        assert_eq!(vendor_name(0x1AF4), "VirtIO");
        assert_eq!(vendor_name(0xDEAD), "Unknown");
    }

    #[test]
    fn test_header_type() {
        let mut dev = e1000();
        assert!(!dev.is_multifunction());
        dev.header_type = 0x81;
        assert!(dev.is_multifunction());
        assert_eq!(dev.header_layout(), 0x01);
    }

    #[test]
    fn test_bar_decoding() {
        let mut dev = e1000();
        assert_eq!(
            dev.bar(0),
            Some(Bar::Memory32 {
                base: 0xFEBC_0000,
                prefetchable: false
            })
        );
        assert_eq!(dev.bar(1), Some(Bar::Io { port: 0xC000 }));
        assert_eq!(dev.bar(2), Some(Bar::Unused));
        assert_eq!(dev.bar(6), None);

        dev.bars[2] = 0xE000_000C;
        dev.bars[3] = 0x0000_0001;
        assert_eq!(
            dev.bar(2),
            Some(Bar::Memory64 {
                base: 0x1_E000_0000,
                prefetchable: true
            })
        );

        dev.bars[5] = 0x0000_0004;
        assert_eq!(dev.bar(5), None);
    }
}
