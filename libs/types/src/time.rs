//! 64-bit NTP timestamps (`t` tag and bundle headers).
//!
//! NTP time is 32.32 fixed point: whole seconds since the 1900 epoch in the
//! high word, fractional seconds in the low word. Bundles carry one of these
//! after the `#bundle` tag; the reserved value 1 means "immediately".

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01).
const UNIX_EPOCH_OFFSET: u64 = 2_208_988_800;

/// One fractional-seconds unit is 1/2^32 s; scale nanoseconds accordingly.
const FRACTION_PER_NANO: f64 = (1u64 << 32) as f64 / 1_000_000_000.0;

/// A 32.32 fixed-point NTP timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    /// The reserved "process immediately" bundle time tag.
    pub const IMMEDIATELY: NtpTimestamp = NtpTimestamp { seconds: 0, fraction: 1 };

    pub fn new(seconds: u32, fraction: u32) -> Self {
        Self { seconds, fraction }
    }

    /// Decode from 8 big-endian wire bytes.
    #[inline]
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self {
            seconds: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            fraction: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Encode to 8 big-endian wire bytes.
    #[inline]
    pub fn to_be_bytes(self) -> [u8; 8] {
        let s = self.seconds.to_be_bytes();
        let f = self.fraction.to_be_bytes();
        [s[0], s[1], s[2], s[3], f[0], f[1], f[2], f[3]]
    }

    /// The current wall-clock time as an NTP timestamp.
    ///
    /// Seconds wrap at the 2036 era boundary, same as every other NTP user.
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_unix) => Self::from_unix_duration(since_unix),
            Err(_) => Self::default(),
        }
    }

    /// Convert a duration since the Unix epoch.
    pub fn from_unix_duration(since_unix: Duration) -> Self {
        let seconds = (since_unix.as_secs() + UNIX_EPOCH_OFFSET) as u32;
        let fraction = (since_unix.subsec_nanos() as f64 * FRACTION_PER_NANO) as u32;
        Self { seconds, fraction }
    }

    /// Convert back to a `SystemTime`. Returns `None` for timestamps before
    /// the Unix epoch (including [`Self::IMMEDIATELY`]).
    pub fn to_system_time(self) -> Option<SystemTime> {
        let unix_seconds = u64::from(self.seconds).checked_sub(UNIX_EPOCH_OFFSET)?;
        let nanos = (self.fraction as f64 / FRACTION_PER_NANO) as u32;
        Some(UNIX_EPOCH + Duration::new(unix_seconds, nanos))
    }

    /// True for the reserved "immediately" value.
    #[inline]
    pub fn is_immediate(self) -> bool {
        self == Self::IMMEDIATELY
    }
}
