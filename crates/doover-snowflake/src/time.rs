use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{DooverSnowflakeId, Error, Result};

/// Doover epoch: Wednesday, January 1, 2025 00:00:00 UTC
///
/// Shared with the Doover server. Changing it shifts every timestamp field
/// and breaks comparability with IDs minted elsewhere.
pub const DOOVER_EPOCH: Duration = Duration::from_millis(DOOVER_EPOCH_MILLIS);

/// [`DOOVER_EPOCH`] in milliseconds since the Unix epoch.
pub const DOOVER_EPOCH_MILLIS: u64 = 1_735_689_600_000;

/// A trait for wall-clock sources.
///
/// This abstraction lets generators run against the real system clock or a
/// mocked clock in tests.
///
/// # Example
///
/// ```
/// use doover_snowflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn unix_millis(&self) -> i64 {
///         1_735_689_601_234
///     }
/// }
///
/// assert_eq!(FixedTime.unix_millis(), 1_735_689_601_234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn unix_millis(&self) -> i64;
}

/// The system wall clock.
///
/// Snowflake timestamps must be comparable with instants supplied by callers
/// (see [`ToUnixMillis`]), so this reads [`SystemTime`] on every call rather
/// than a monotonic ticker.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn unix_millis(&self) -> i64 {
        SystemTime::now().to_unix_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn unix_millis(&self) -> i64 {
        (**self).unix_millis()
    }
}

/// Conversion of a caller-supplied instant into signed milliseconds since
/// the Unix epoch, floored to the millisecond.
pub trait ToUnixMillis {
    fn to_unix_millis(&self) -> i64;
}

impl ToUnixMillis for SystemTime {
    fn to_unix_millis(&self) -> i64 {
        match self.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(err) => {
                // Floor towards negative infinity for pre-1970 instants.
                let before = err.duration();
                let millis = i64::try_from(before.as_millis()).unwrap_or(i64::MAX);
                let partial = before.subsec_nanos() % 1_000_000 != 0;
                -millis - i64::from(partial)
            }
        }
    }
}

/// Plain integers are taken to already be Unix milliseconds.
impl ToUnixMillis for i64 {
    fn to_unix_millis(&self) -> i64 {
        *self
    }
}

impl ToUnixMillis for DooverSnowflakeId {
    fn to_unix_millis(&self) -> i64 {
        // 42-bit offset plus the epoch always fits in i64.
        self.unix_millis() as i64
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> ToUnixMillis for chrono::DateTime<Tz> {
    fn to_unix_millis(&self) -> i64 {
        self.timestamp_millis()
    }
}

impl<T: ToUnixMillis + ?Sized> ToUnixMillis for &T {
    fn to_unix_millis(&self) -> i64 {
        (**self).to_unix_millis()
    }
}

/// Converts Unix milliseconds into a timestamp field value.
///
/// # Errors
///
/// - [`Error::BeforeEpoch`] if `unix_millis` precedes [`DOOVER_EPOCH`]
/// - [`Error::TimestampOverflow`] if the offset does not fit in 42 bits
pub fn millis_since_epoch(unix_millis: i64) -> Result<u64> {
    let offset = unix_millis
        .checked_sub(DOOVER_EPOCH_MILLIS as i64)
        .filter(|offset| *offset >= 0)
        .ok_or(Error::BeforeEpoch { unix_millis })?;
    let timestamp = offset as u64;
    if timestamp > DooverSnowflakeId::TIMESTAMP_MASK {
        return Err(Error::TimestampOverflow {
            timestamp,
            max: DooverSnowflakeId::TIMESTAMP_MASK,
        });
    }
    Ok(timestamp)
}
