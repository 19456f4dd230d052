use crate::{DooverSnowflakeId, Origin, Result, SnowflakeGenerator, SnowflakeType, ToUnixMillis};

/// Mints an ID for the current wall-clock millisecond using the
/// process-wide random cycle.
///
/// Pass `SnowflakeType::default()`, `0` and `0` for the defaults
/// (`Unknown`, region 0, instance 0). Deployments running more than one
/// instance should assign distinct origins or use a [`SnowflakeGenerator`].
///
/// # Errors
///
/// - [`Error::RegionIdOverflow`] / [`Error::InstanceIdOverflow`] for fields
///   wider than their slots
/// - [`Error::BeforeEpoch`] if the system clock reads earlier than
///   [`DOOVER_EPOCH`]
///
/// Nothing is drawn from the cycle when an error is returned.
///
/// # Example
/// ```
/// use doover_snowflake::{generate_snowflake_id, SnowflakeType};
///
/// let first = generate_snowflake_id(SnowflakeType::Message, 0, 0)?;
/// std::thread::sleep(std::time::Duration::from_millis(2));
/// let second = generate_snowflake_id(SnowflakeType::Message, 0, 0)?;
/// assert!(first < second);
/// # Ok::<(), doover_snowflake::Error>(())
/// ```
///
/// [`Error::RegionIdOverflow`]: crate::Error::RegionIdOverflow
/// [`Error::InstanceIdOverflow`]: crate::Error::InstanceIdOverflow
/// [`Error::BeforeEpoch`]: crate::Error::BeforeEpoch
/// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
pub fn generate_snowflake_id(
    type_id: SnowflakeType,
    region_id: u8,
    instance_id: u16,
) -> Result<DooverSnowflakeId> {
    SnowflakeGenerator::new(Origin::new(region_id, instance_id)?).generate_id(type_id)
}

/// Mints an ID for `at` using the process-wide random cycle when
/// `use_random` is set, and a zero random field otherwise.
///
/// With `use_random == false` this is pure and yields the lowest ID for the
/// given millisecond and fields, suitable as a range-query boundary (see
/// [`cursor_at`]).
///
/// # Errors
///
/// Same as [`generate_snowflake_id`], plus [`Error::TimestampOverflow`] for
/// instants past the 42-bit range.
///
/// # Example
/// ```
/// use doover_snowflake::{generate_snowflake_id_at, SnowflakeType, DOOVER_EPOCH};
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let at = UNIX_EPOCH + DOOVER_EPOCH;
/// let id = generate_snowflake_id_at(at, SnowflakeType::Message, 0, 0, false)?;
/// assert_eq!(id.to_raw(), 32);
///
/// let next_ms = at + Duration::from_millis(1);
/// let later = generate_snowflake_id_at(next_ms, SnowflakeType::Message, 0, 0, false)?;
/// assert_eq!(later.to_raw(), 4_194_336);
/// # Ok::<(), doover_snowflake::Error>(())
/// ```
///
/// [`cursor_at`]: crate::cursor_at
/// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
pub fn generate_snowflake_id_at(
    at: impl ToUnixMillis,
    type_id: SnowflakeType,
    region_id: u8,
    instance_id: u16,
    use_random: bool,
) -> Result<DooverSnowflakeId> {
    SnowflakeGenerator::new(Origin::new(region_id, instance_id)?).generate_id_at(
        at,
        type_id,
        use_random,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DOOVER_EPOCH, Error, SystemClock, TimeSource, process_cycle};
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn epoch_scenarios() {
        let epoch = UNIX_EPOCH + DOOVER_EPOCH;
        let at_epoch =
            generate_snowflake_id_at(epoch, SnowflakeType::Message, 0, 0, false).unwrap();
        assert_eq!(at_epoch.to_raw(), 32);

        let one_ms_later = generate_snowflake_id_at(
            epoch + Duration::from_millis(1),
            SnowflakeType::Message,
            0,
            0,
            false,
        )
        .unwrap();
        assert_eq!(one_ms_later.to_raw(), 4_194_336);
        assert!(one_ms_later > at_epoch);
    }

    #[test]
    fn current_ids_carry_the_current_time() {
        let before = SystemClock.unix_millis();
        let id = generate_snowflake_id(SnowflakeType::Channel, 2, 17).unwrap();
        let after = SystemClock.unix_millis();

        let minted = id.unix_millis() as i64;
        assert!(before <= minted && minted <= after);
        assert_eq!(id.region_id(), 2);
        assert_eq!(id.instance_id(), 17);
        assert_eq!(id.kind(), Ok(SnowflakeType::Channel));
    }

    #[test]
    fn invalid_fields_are_rejected() {
        assert!(matches!(
            generate_snowflake_id(SnowflakeType::Agent, 16, 0),
            Err(Error::RegionIdOverflow { .. })
        ));
        assert!(matches!(
            generate_snowflake_id_at(
                UNIX_EPOCH + DOOVER_EPOCH,
                SnowflakeType::Agent,
                0,
                1024,
                true
            ),
            Err(Error::InstanceIdOverflow { .. })
        ));
        assert!(matches!(
            generate_snowflake_id_at(UNIX_EPOCH, SnowflakeType::Agent, 0, 0, false),
            Err(Error::BeforeEpoch { .. })
        ));
    }

    #[test]
    fn random_draws_come_from_the_process_cycle() {
        let permutation = process_cycle().permutation();
        let id = generate_snowflake_id_at(
            UNIX_EPOCH + DOOVER_EPOCH,
            SnowflakeType::Token,
            0,
            0,
            true,
        )
        .unwrap();
        assert!(permutation.contains(&(id.random() as u8)));
    }
}
