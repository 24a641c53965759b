//! CMOS real-time clock for x86_64.

use kestrel_common::{DateTime, RtcError};
use kestrel_devices::rtc::Rtc;
use spin::Mutex;
use x86_64::instructions::interrupts;

use super::port::X86PortIo;

/// Status polls [`try_now`] allows before reporting a stuck update.
///
/// An update cycle takes under 2ms; this is far above that on any machine
/// the kernel targets.
pub const RTC_UPDATE_POLL_LIMIT: u32 = 1_000_000;

/// Global RTC driver, lazily initialized.
pub static RTC: spin::Once<Mutex<Rtc<X86PortIo>>> = spin::Once::new();

/// Initializes the global RTC driver.
///
/// Idempotent.
pub fn init() {
    rtc();
}

fn rtc() -> &'static Mutex<Rtc<X86PortIo>> {
    RTC.call_once(|| {
        // SAFETY: The kernel runs in ring 0, and this is the only capability
        // that drives 0x70/0x71; it is only reachable through the mutex.
        let io = unsafe { X86PortIo::new() };
        Mutex::new(Rtc::new(io).with_update_timeout(RTC_UPDATE_POLL_LIMIT))
    })
}

/// Current wall-clock time.
///
/// Waits for the chip without a bound.
pub fn now() -> DateTime {
    interrupts::without_interrupts(|| rtc().lock().read())
}

/// Current wall-clock time, giving up after [`RTC_UPDATE_POLL_LIMIT`] polls.
pub fn try_now() -> Result<DateTime, RtcError> {
    interrupts::without_interrupts(|| rtc().lock().try_read())
}
