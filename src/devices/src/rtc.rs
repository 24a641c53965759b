//! CMOS real-time clock driver.
//!
//! Reads the calendar registers of the MC146818-compatible RTC through the
//! CMOS index/data ports and normalizes them to binary, 24-hour form.
//!
//! # References
//!
//! - <https://wiki.osdev.org/CMOS>

use bitflags::bitflags;
use core::hint::spin_loop;

use kestrel_common::{DateTime, RtcError};
use kestrel_hal::PortIo;

pub use kestrel_common::time::{month_name, weekday_name};

/// CMOS index port (0x70).
const CMOS_ADDRESS: u16 = 0x70;

/// CMOS data port (0x71).
const CMOS_DATA: u16 = 0x71;

/// Set on every index write so an NMI cannot land between index and data.
const NMI_DISABLE: u8 = 0x80;

/// PM flag of the hour register in 12-hour mode.
const HOUR_PM: u8 = 0x80;

/// Year assumed for chips without a century register.
const DEFAULT_CENTURY_BASE: u16 = 2000;

/// CMOS register indices.
pub mod reg {
    /// Seconds.
    pub const SECONDS: u8 = 0x00;
    /// Minutes.
    pub const MINUTES: u8 = 0x02;
    /// Hours, bit 7 is the PM flag in 12-hour mode.
    pub const HOURS: u8 = 0x04;
    /// Day of week (1 = Sunday).
    pub const WEEKDAY: u8 = 0x06;
    /// Day of month.
    pub const DAY: u8 = 0x07;
    /// Month.
    pub const MONTH: u8 = 0x08;
    /// Year within the century.
    pub const YEAR: u8 = 0x09;
    /// Status register A.
    pub const STATUS_A: u8 = 0x0A;
    /// Status register B.
    pub const STATUS_B: u8 = 0x0B;
    /// Century (where the firmware provides one).
    pub const CENTURY: u8 = 0x32;
}

bitflags! {
    /// Status register A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusA: u8 {
        /// The chip is updating its time registers.
        const UPDATE_IN_PROGRESS = 1 << 7;
    }
}

bitflags! {
    /// Status register B, the data format bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusB: u8 {
        /// Hours run 0-23 instead of 1-12 with a PM flag.
        const HOUR_24 = 1 << 1;
        /// Registers hold binary values instead of BCD.
        const BINARY = 1 << 2;
    }
}

/// Time registers exactly as read from the chip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawTime {
    /// Seconds register.
    pub second: u8,
    /// Minutes register.
    pub minute: u8,
    /// Hours register, including the PM flag.
    pub hour: u8,
    /// Weekday register.
    pub weekday: u8,
    /// Day of month register.
    pub day: u8,
    /// Month register.
    pub month: u8,
    /// Year register.
    pub year: u8,
    /// Century register (0 when the chip has none).
    pub century: u8,
}

/// Convert a packed BCD byte to binary.
pub const fn bcd_to_binary(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Normalize raw registers to a binary, 24-hour [`DateTime`].
///
/// A zero century register means the chip does not keep one and the year is
/// taken to be in the 2000s.
pub fn decode(raw: RawTime, mode: StatusB) -> DateTime {
    let binary = mode.contains(StatusB::BINARY);
    let field = |value: u8| if binary { value } else { bcd_to_binary(value) };

    let pm = (raw.hour & HOUR_PM) != 0;
    let mut hour = field(raw.hour & !HOUR_PM);
    if !mode.contains(StatusB::HOUR_24) {
        // 12 AM is hour 0, 12 PM is hour 12
        hour %= 12;
        if pm {
            hour += 12;
        }
    }

    let year_low = field(raw.year) as u16;
    let century = field(raw.century) as u16;
    let year = if century != 0 {
        century * 100 + year_low
    } else {
        DEFAULT_CENTURY_BASE + year_low
    };

    DateTime {
        year,
        month: field(raw.month),
        day: field(raw.day),
        hour,
        minute: field(raw.minute),
        second: field(raw.second),
        weekday: raw.weekday,
    }
}

/// Real-time clock on the CMOS port pair.
///
/// The eight-register read is not atomic with respect to other users of
/// ports 0x70/0x71; share an `Rtc` behind a lock.
pub struct Rtc<P> {
    io: P,
    update_timeout: Option<u32>,
}

impl<P: PortIo> Rtc<P> {
    /// Create a driver that waits out updates indefinitely.
    pub const fn new(io: P) -> Self {
        Self {
            io,
            update_timeout: None,
        }
    }

    /// Bound the update-in-progress wait of [`Rtc::try_read`] to `polls`
    /// status reads (at least one).
    pub fn with_update_timeout(mut self, polls: u32) -> Self {
        self.update_timeout = Some(polls.max(1));
        self
    }

    /// Give back the port capability.
    pub fn into_inner(self) -> P {
        self.io
    }

    /// Read the current date and time.
    ///
    /// Spins until the chip is not mid-update. A chip whose update flag never
    /// clears hangs this call; use [`Rtc::try_read`] with a timeout where
    /// that matters.
    pub fn read(&mut self) -> DateTime {
        while self.update_in_progress() {
            spin_loop();
        }
        self.sample()
    }

    /// Read the current date and time, honouring the configured timeout.
    ///
    /// Without a timeout this behaves exactly like [`Rtc::read`].
    pub fn try_read(&mut self) -> Result<DateTime, RtcError> {
        let Some(limit) = self.update_timeout else {
            return Ok(self.read());
        };

        let mut polls = 0;
        while self.update_in_progress() {
            polls += 1;
            if polls >= limit {
                log::warn!("rtc: update in progress after {} polls", polls);
                return Err(RtcError::UpdateTimeout { polls });
            }
            spin_loop();
        }
        Ok(self.sample())
    }

    /// Read the time registers in their fixed order, without waiting.
    pub fn read_raw(&mut self) -> RawTime {
        RawTime {
            second: self.read_register(reg::SECONDS),
            minute: self.read_register(reg::MINUTES),
            hour: self.read_register(reg::HOURS),
            weekday: self.read_register(reg::WEEKDAY),
            day: self.read_register(reg::DAY),
            month: self.read_register(reg::MONTH),
            year: self.read_register(reg::YEAR),
            century: self.read_register(reg::CENTURY),
        }
    }

    /// Current data format.
    pub fn mode(&mut self) -> StatusB {
        StatusB::from_bits_truncate(self.read_register(reg::STATUS_B))
    }

    fn update_in_progress(&mut self) -> bool {
        StatusA::from_bits_truncate(self.read_register(reg::STATUS_A))
            .contains(StatusA::UPDATE_IN_PROGRESS)
    }

    fn sample(&mut self) -> DateTime {
        let raw = self.read_raw();
        // The format bits apply to every register read above.
        let mode = self.mode();
        log::trace!(
            "rtc: binary={} 24h={}",
            mode.contains(StatusB::BINARY),
            mode.contains(StatusB::HOUR_24)
        );
        decode(raw, mode)
    }

    fn read_register(&mut self, reg: u8) -> u8 {
        self.io.outb(CMOS_ADDRESS, reg | NMI_DISABLE);
        self.io.inb(CMOS_DATA)
    }
}
