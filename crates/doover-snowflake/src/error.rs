use core::num::ParseIntError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `doover-snowflake` can produce.
///
/// Every variant describes bad caller input. Generation itself cannot fail,
/// and validation always runs before the shared random cycle is advanced, so
/// a failed call leaves no observable state behind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The region ID does not fit in its 4-bit field.
    #[error("region_id {region_id} exceeds the maximum of {max}")]
    RegionIdOverflow { region_id: u64, max: u64 },

    /// The instance ID does not fit in its 10-bit field.
    #[error("instance_id {instance_id} exceeds the maximum of {max}")]
    InstanceIdOverflow { instance_id: u64, max: u64 },

    /// A raw type discriminant does not fit in its 4-bit field.
    #[error("type_id {type_id} exceeds the maximum of {max}")]
    TypeIdOverflow { type_id: u64, max: u64 },

    /// A raw random value does not fit in its 4-bit field.
    #[error("random {random} exceeds the maximum of {max}")]
    RandomOverflow { random: u64, max: u64 },

    /// The millisecond offset from [`DOOVER_EPOCH`] does not fit in 42 bits.
    ///
    /// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
    #[error("timestamp {timestamp} exceeds the maximum of {max}")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// The instant lies before [`DOOVER_EPOCH`] and has no timestamp field.
    ///
    /// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
    #[error("instant at {unix_millis} ms since the Unix epoch is before the Doover epoch")]
    BeforeEpoch { unix_millis: i64 },

    /// The type discriminant is not assigned to any [`SnowflakeType`].
    ///
    /// [`SnowflakeType`]: crate::SnowflakeType
    #[error("unknown snowflake type discriminant {0}")]
    UnknownType(u8),

    /// A time window ends before it starts.
    #[error("window end ({end} ms) is before its start ({start} ms)")]
    InvertedWindow { start: i64, end: i64 },

    /// The text is not a decimal 64-bit snowflake ID.
    #[error("invalid snowflake id: {0}")]
    ParseId(#[from] ParseIntError),

    /// The text does not name a [`SnowflakeType`].
    ///
    /// [`SnowflakeType`]: crate::SnowflakeType
    #[error("invalid snowflake type: {0:?}")]
    ParseType(String),
}
