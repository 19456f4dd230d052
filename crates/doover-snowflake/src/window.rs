//! Time-window cursors for ID-filtered listings.
//!
//! The channel message listing endpoint filters by snowflake ID rather than
//! by timestamp. A time window `[start, end)` therefore has to be translated
//! into an `after`/`before` pair of IDs. Both edges use the lowest ID of
//! their millisecond (origin and random fields zero), so every message
//! minted in `start`'s millisecond sorts at or above `after`, and every
//! message minted in `end`'s millisecond sorts at or above `before`.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DooverSnowflakeId, Error, Result, ToUnixMillis, millis_since_epoch};

/// Page size the server applies when a listing request carries no `limit`.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;

/// The lowest ID that can exist for the millisecond containing `at`.
///
/// Equivalent to `generate_snowflake_id_at(at, Unknown, 0, 0, false)`, but
/// never touches the random cycle.
///
/// # Errors
///
/// - [`Error::BeforeEpoch`] if `at` precedes [`DOOVER_EPOCH`]
/// - [`Error::TimestampOverflow`] past the 42-bit range
///
/// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
pub fn cursor_at(at: impl ToUnixMillis) -> Result<DooverSnowflakeId> {
    let timestamp = millis_since_epoch(at.to_unix_millis())?;
    Ok(DooverSnowflakeId::lowest_at(timestamp))
}

/// A half-open time window expressed as snowflake cursors.
///
/// # Example
/// ```
/// use doover_snowflake::{MessageWindow, DOOVER_EPOCH};
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let start = UNIX_EPOCH + DOOVER_EPOCH + Duration::from_secs(60);
/// let window = MessageWindow::new(start, start + Duration::from_secs(60))?;
/// assert_eq!(window.after().timestamp(), 60_000);
/// assert_eq!(window.before().timestamp(), 120_000);
/// # Ok::<(), doover_snowflake::Error>(())
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageWindow {
    after: DooverSnowflakeId,
    before: DooverSnowflakeId,
}

impl MessageWindow {
    /// Builds the cursor pair for `[start, end)`.
    ///
    /// `start == end` is accepted and yields an empty window.
    ///
    /// # Errors
    ///
    /// - [`Error::InvertedWindow`] if `end` is earlier than `start`
    /// - anything [`cursor_at`] returns for either edge
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn new(start: impl ToUnixMillis, end: impl ToUnixMillis) -> Result<Self> {
        let (start, end) = (start.to_unix_millis(), end.to_unix_millis());
        if end < start {
            return Err(Error::InvertedWindow { start, end });
        }
        let window = Self {
            after: cursor_at(start)?,
            before: cursor_at(end)?,
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(after = %window.after, before = %window.before, "built message window");
        Ok(window)
    }

    /// Builds a window directly from two cursors.
    ///
    /// # Errors
    ///
    /// [`Error::InvertedWindow`] if `before < after`.
    pub fn from_cursors(after: DooverSnowflakeId, before: DooverSnowflakeId) -> Result<Self> {
        if before < after {
            return Err(Error::InvertedWindow {
                start: after.unix_millis() as i64,
                end: before.unix_millis() as i64,
            });
        }
        Ok(Self { after, before })
    }

    /// Lower cursor, passed as the `after` query parameter.
    pub const fn after(&self) -> DooverSnowflakeId {
        self.after
    }

    /// Upper cursor, passed as the `before` query parameter.
    pub const fn before(&self) -> DooverSnowflakeId {
        self.before
    }

    /// Whether `id` falls in `after <= id < before`.
    pub fn contains(&self, id: DooverSnowflakeId) -> bool {
        self.after <= id && id < self.before
    }

    pub fn is_empty(&self) -> bool {
        self.after == self.before
    }
}

/// Query parameters for the channel message listing endpoint.
///
/// Unset fields are omitted, letting the server apply its defaults (a page
/// of [`DEFAULT_MESSAGE_LIMIT`] messages, no cursor bounds).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageQuery {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub limit: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub before: Option<DooverSnowflakeId>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub after: Option<DooverSnowflakeId>,
}

impl MessageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn before(mut self, before: DooverSnowflakeId) -> Self {
        self.before = Some(before);
        self
    }

    pub fn after(mut self, after: DooverSnowflakeId) -> Self {
        self.after = Some(after);
        self
    }

    /// Restricts the query to `window`, keeping any limit already set.
    pub fn window(self, window: MessageWindow) -> Self {
        self.after(window.after()).before(window.before())
    }

    /// The parameters as `(name, value)` pairs in `limit`, `before`, `after`
    /// order, skipping unset ones.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(before) = self.before {
            pairs.push(("before", before.to_string()));
        }
        if let Some(after) = self.after {
            pairs.push(("after", after.to_string()));
        }
        pairs
    }
}

impl From<MessageWindow> for MessageQuery {
    fn from(window: MessageWindow) -> Self {
        Self::new().window(window)
    }
}
