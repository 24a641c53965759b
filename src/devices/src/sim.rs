//! Simulated port space for driver tests.
//!
//! Models the PCI mechanism #1 address latch on 0xCF8/0xCFC and the CMOS
//! index/data pair on 0x70/0x71, and records every access that reaches a
//! device so tests can assert on probing order.

extern crate std;

use std::collections::BTreeMap;
use std::vec::Vec;

use kestrel_common::pci::PciAddress;
use kestrel_hal::PortIo;

const PCI_CONFIG_ADDRESS: u16 = 0x0CF8;
const PCI_CONFIG_DATA: u16 = 0x0CFC;
const CMOS_ADDRESS: u16 = 0x70;
const CMOS_DATA: u16 = 0x71;
const CMOS_STATUS_A: u8 = 0x0A;
const UPDATE_IN_PROGRESS: u8 = 0x80;

/// 256 bytes of type 0 configuration header as 64 dwords.
type ConfigRegs = [u32; 64];

pub struct SimPorts {
    pci_latch: u32,
    functions: BTreeMap<PciAddress, ConfigRegs>,
    config_reads: Vec<(PciAddress, u8)>,

    cmos_index: u8,
    cmos: [u8; 128],
    busy_polls: u32,
    cmos_reads: Vec<u8>,
    nmi_disabled: bool,
}

impl SimPorts {
    pub fn new() -> Self {
        Self {
            pci_latch: 0,
            functions: BTreeMap::new(),
            config_reads: Vec::new(),
            cmos_index: 0,
            cmos: [0; 128],
            busy_polls: 0,
            cmos_reads: Vec::new(),
            nmi_disabled: true,
        }
    }

    /// Install a function with identity, base class and header type.
    pub fn add_function(
        &mut self,
        addr: PciAddress,
        vendor_id: u16,
        device_id: u16,
        class_code: u8,
        header_type: u8,
    ) {
        self.set_config_u32(addr, 0x00, (device_id as u32) << 16 | vendor_id as u32);
        self.set_config_u32(addr, 0x08, (class_code as u32) << 24);
        self.set_config_u32(addr, 0x0C, (header_type as u32) << 16);
    }

    pub fn set_config_u32(&mut self, addr: PciAddress, offset: u8, value: u32) {
        let regs = self.functions.entry(addr).or_insert([0; 64]);
        regs[(offset >> 2) as usize] = value;
    }

    pub fn config_u32(&self, addr: PciAddress, offset: u8) -> u32 {
        self.functions
            .get(&addr)
            .map_or(0xFFFF_FFFF, |regs| regs[(offset >> 2) as usize])
    }

    /// Every (function, aligned offset) that a data-port read reached.
    pub fn config_reads(&self) -> &[(PciAddress, u8)] {
        &self.config_reads
    }

    /// Whether any configuration read targeted `addr`.
    pub fn probed(&self, addr: PciAddress) -> bool {
        self.config_reads.iter().any(|(a, _)| *a == addr)
    }

    pub fn set_cmos(&mut self, reg: u8, value: u8) {
        self.cmos[reg as usize] = value;
    }

    /// Report an update in progress for the next `polls` status A reads.
    pub fn set_busy_polls(&mut self, polls: u32) {
        self.busy_polls = polls;
    }

    /// CMOS registers read through the data port, in order.
    pub fn cmos_reads(&self) -> &[u8] {
        &self.cmos_reads
    }

    /// Whether every CMOS index write so far kept NMI disabled.
    pub fn nmi_disabled(&self) -> bool {
        self.nmi_disabled
    }

    fn latched_target(&self) -> Option<(PciAddress, u8)> {
        let latch = self.pci_latch;
        if latch & (1 << 31) == 0 {
            return None;
        }
        let addr = PciAddress::new(
            (latch >> 16) as u8,
            ((latch >> 11) & 0x1F) as u8,
            ((latch >> 8) & 0x07) as u8,
        );
        Some((addr, (latch & 0xFC) as u8))
    }
}

impl PortIo for SimPorts {
    fn outb(&mut self, port: u16, value: u8) {
        match port {
            CMOS_ADDRESS => {
                self.nmi_disabled &= (value & 0x80) != 0;
                self.cmos_index = value & 0x7F;
            }
            _ => panic!("unexpected outb to {:#x}", port),
        }
    }

    fn inb(&mut self, port: u16) -> u8 {
        match port {
            CMOS_DATA => {
                let index = self.cmos_index;
                self.cmos_reads.push(index);
                let value = self.cmos[index as usize];
                if index == CMOS_STATUS_A {
                    if self.busy_polls > 0 {
                        self.busy_polls -= 1;
                        return value | UPDATE_IN_PROGRESS;
                    }
                    return value & !UPDATE_IN_PROGRESS;
                }
                value
            }
            _ => panic!("unexpected inb from {:#x}", port),
        }
    }

    fn outl(&mut self, port: u16, value: u32) {
        match port {
            PCI_CONFIG_ADDRESS => self.pci_latch = value,
            PCI_CONFIG_DATA => {
                if let Some((addr, offset)) = self.latched_target() {
                    if let Some(regs) = self.functions.get_mut(&addr) {
                        regs[(offset >> 2) as usize] = value;
                    }
                }
            }
            _ => panic!("unexpected outl to {:#x}", port),
        }
    }

    fn inl(&mut self, port: u16) -> u32 {
        match port {
            PCI_CONFIG_DATA => match self.latched_target() {
                Some((addr, offset)) => {
                    self.config_reads.push((addr, offset));
                    self.config_u32(addr, offset)
                }
                None => 0xFFFF_FFFF,
            },
            _ => panic!("unexpected inl from {:#x}", port),
        }
    }
}
