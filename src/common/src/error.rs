//! System-wide error types for Kestrel.

use core::fmt;

/// Real-time clock error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RtcError {
    /// The update-in-progress flag stayed set for the whole poll budget.
    UpdateTimeout {
        /// Number of status polls performed before giving up.
        polls: u32,
    },
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcError::UpdateTimeout { polls } => {
                write!(f, "RTC update still in progress after {} polls", polls)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_update_timeout_message() {
        let err = RtcError::UpdateTimeout { polls: 1000 };
        assert_eq!(
            err.to_string(),
            "RTC update still in progress after 1000 polls"
        );
    }
}
