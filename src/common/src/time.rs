//! Calendar time as read from the real-time clock.

use core::fmt;

/// Names indexed by the RTC weekday value, slot 0 is the unknown sentinel.
const WEEKDAYS: [&str; 8] = [
    "Unknown",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Names indexed by month number, slot 0 is the unknown sentinel.
const MONTHS: [&str; 13] = [
    "Unknown",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A decoded RTC timestamp.
///
/// Fields are always binary and the hour is always in 24-hour form,
/// whatever mode the chip itself runs in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    /// Four-digit year.
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-59).
    pub second: u8,
    /// Day of week (1 = Sunday .. 7 = Saturday, 0 = unknown).
    pub weekday: u8,
}

impl DateTime {
    /// Name of this timestamp's weekday.
    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }

    /// Name of this timestamp's month.
    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {:02}, {:04} - {:02}:{:02}:{:02}",
            self.weekday_name(),
            self.month_name(),
            self.day,
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Weekday name for a 1-based weekday (1 = Sunday).
///
/// 0 and anything above 7 return `"Unknown"`.
pub fn weekday_name(weekday: u8) -> &'static str {
    WEEKDAYS.get(weekday as usize).copied().unwrap_or(WEEKDAYS[0])
}

/// Month name for a 1-based month.
///
/// 0 and anything above 12 return `"Unknown"`.
pub fn month_name(month: u8) -> &'static str {
    MONTHS.get(month as usize).copied().unwrap_or(MONTHS[0])
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(0), "Unknown");
        assert_eq!(weekday_name(8), "Unknown");
        assert_eq!(weekday_name(255), "Unknown");

        let expected = [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ];
        for (i, name) in expected.iter().enumerate() {
            assert_eq!(weekday_name(i as u8 + 1), *name);
        }
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_display() {
        let dt = DateTime {
            year: 2024,
            month: 3,
            day: 5,
            hour: 7,
            minute: 4,
            second: 9,
            weekday: 3,
        };
        assert_eq!(format!("{}", dt), "Tuesday, March 05, 2024 - 07:04:09");
    }

    #[test]
    fn test_unknown_weekday_display() {
        let dt = DateTime {
            year: 2000,
            month: 1,
            day: 1,
            ..DateTime::default()
        };
        assert_eq!(format!("{}", dt), "Unknown, January 01, 2000 - 00:00:00");
    }
}
