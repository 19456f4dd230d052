#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    DooverSnowflakeId, Origin, RandSource, Result, ShuffledCycle, SnowflakeType, SystemClock,
    TimeSource, ToUnixMillis, millis_since_epoch, process_cycle,
};

/// A Doover snowflake generator bound to one [`Origin`].
///
/// The generator is stateless apart from its random source: it reads the
/// clock, draws a random value and packs the fields. By default it runs on
/// the system wall clock and draws from the process-wide [`ShuffledCycle`],
/// so IDs minted here interleave correctly with those from
/// [`generate_snowflake_id`]. Supply your own sources with
/// [`Self::with_sources`] for isolated cycles or deterministic tests.
///
/// ## Features
/// - ✅ Thread-safe when the sources are (the defaults are)
/// - ✅ Validated origin, so no field can overflow into a neighbour
///
/// # Example
/// ```
/// use doover_snowflake::{Origin, SnowflakeGenerator, SnowflakeType};
///
/// let generator = SnowflakeGenerator::new(Origin::new(3, 5)?);
/// let id = generator.generate_id(SnowflakeType::Message)?;
/// assert_eq!(id.region_id(), 3);
/// assert_eq!(id.instance_id(), 5);
/// assert_eq!(id.kind()?, SnowflakeType::Message);
/// # Ok::<(), doover_snowflake::Error>(())
/// ```
///
/// [`generate_snowflake_id`]: crate::generate_snowflake_id
#[derive(Clone, Debug)]
pub struct SnowflakeGenerator<T = SystemClock, R = &'static ShuffledCycle>
where
    T: TimeSource,
    R: RandSource<u8>,
{
    origin: Origin,
    time: T,
    rand: R,
}

impl SnowflakeGenerator {
    /// Creates a generator on the system clock and the process-wide cycle.
    ///
    /// The origin is required: in a multi-instance deployment, defaulting it
    /// to zero would silently collide with other instances.
    pub fn new(origin: Origin) -> Self {
        Self::with_sources(origin, SystemClock, process_cycle())
    }
}

impl<T, R> SnowflakeGenerator<T, R>
where
    T: TimeSource,
    R: RandSource<u8>,
{
    /// Creates a generator from explicit time and random sources.
    pub fn with_sources(origin: Origin, time: T, rand: R) -> Self {
        Self { origin, time, rand }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Mints an ID for the current wall-clock millisecond.
    ///
    /// Two calls within the same millisecond differ unless sixteen or more
    /// draws from the same random source land in that millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::BeforeEpoch`] if the clock reads earlier than
    ///   [`DOOVER_EPOCH`]
    /// - [`Error::TimestampOverflow`] once the 42-bit timestamp is exhausted
    ///
    /// [`Error::BeforeEpoch`]: crate::Error::BeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_id(&self, kind: SnowflakeType) -> Result<DooverSnowflakeId> {
        self.pack(self.time.unix_millis(), kind, true)
    }

    /// Mints an ID for an arbitrary instant.
    ///
    /// With `use_random == false` the random field is zero, which makes the
    /// result the smallest ID this origin can produce for that millisecond
    /// and kind. That is the form used for range-query cursors. With
    /// `use_random == true` the value is drawn like [`Self::generate_id`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_id`], for `at` instead of the clock. The
    /// random source is only advanced once validation has passed.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self, at), fields(at = at.to_unix_millis()))
    )]
    pub fn generate_id_at(
        &self,
        at: impl ToUnixMillis,
        kind: SnowflakeType,
        use_random: bool,
    ) -> Result<DooverSnowflakeId> {
        self.pack(at.to_unix_millis(), kind, use_random)
    }

    fn pack(
        &self,
        unix_millis: i64,
        kind: SnowflakeType,
        use_random: bool,
    ) -> Result<DooverSnowflakeId> {
        let timestamp = millis_since_epoch(unix_millis).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::debug!(unix_millis, error = %_e, "rejected snowflake instant");
        })?;
        let random = if use_random {
            u64::from(self.rand.rand())
        } else {
            0
        };
        Ok(DooverSnowflakeId::from(
            timestamp,
            u64::from(self.origin.region_id()),
            u64::from(self.origin.instance_id()),
            u64::from(kind),
            random,
        ))
    }
}
