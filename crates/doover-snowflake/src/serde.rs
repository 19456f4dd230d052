//! Serde support for [`DooverSnowflakeId`].
//!
//! IDs serialize as their native `u64` by default, matching the integer IDs
//! the Doover API exchanges. [`as_string_id`] switches a field to a decimal
//! string for consumers whose JSON numbers cannot hold 64 bits.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DooverSnowflakeId;

impl Serialize for DooverSnowflakeId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for DooverSnowflakeId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        u64::deserialize(d).map(Self::from_raw)
    }
}

/// Serialize an ID as a decimal string; deserialize from either a decimal
/// string or a native integer.
///
/// ```
/// use doover_snowflake::DooverSnowflakeId;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Row {
///     #[serde(with = "doover_snowflake::as_string_id")]
///     id: DooverSnowflakeId,
/// }
///
/// let row = Row { id: DooverSnowflakeId::from_raw(4194336) };
/// assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"id":"4194336"}"#);
/// ```
pub mod as_string_id {
    use super::*;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &DooverSnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    /// # Errors
    ///
    /// Returns an error if the input is neither a decimal `u64` string nor a
    /// non-negative integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DooverSnowflakeId, D::Error> {
        d.deserialize_any(IdVisitor)
    }

    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = DooverSnowflakeId;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a snowflake ID as a decimal string or unsigned integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(DooverSnowflakeId::from_raw(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map(DooverSnowflakeId::from_raw)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }
    }
}
