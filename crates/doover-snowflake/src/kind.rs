use core::fmt;
use core::str::FromStr;

use crate::{Error, Result};

/// The entity kind encoded in the 4-bit `type_id` field of a
/// [`DooverSnowflakeId`].
///
/// The discriminants are shared with the Doover server and must not be
/// renumbered. Values `7..=15` are unassigned.
///
/// [`DooverSnowflakeId`]: crate::DooverSnowflakeId
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "u8", try_from = "u8"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SnowflakeType {
    #[default]
    Unknown = 0,
    Agent = 1,
    Message = 2,
    Channel = 3,
    WssSession = 4,
    ProcessorSchedule = 5,
    Token = 6,
}

impl SnowflakeType {
    /// Every assigned kind, in discriminant order.
    pub const ALL: [Self; 7] = [
        Self::Unknown,
        Self::Agent,
        Self::Message,
        Self::Channel,
        Self::WssSession,
        Self::ProcessorSchedule,
        Self::Token,
    ];

    /// The raw discriminant stored in the ID.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Agent => "agent",
            Self::Message => "message",
            Self::Channel => "channel",
            Self::WssSession => "wss_session",
            Self::ProcessorSchedule => "processor_schedule",
            Self::Token => "token",
        }
    }
}

impl TryFrom<u8> for SnowflakeType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(Error::UnknownType(value))
    }
}

impl From<SnowflakeType> for u8 {
    fn from(kind: SnowflakeType) -> Self {
        kind.as_u8()
    }
}

impl From<SnowflakeType> for u64 {
    fn from(kind: SnowflakeType) -> Self {
        u64::from(kind.as_u8())
    }
}

impl fmt::Display for SnowflakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnowflakeType {
    type Err = Error;

    /// Accepts the lowercase name (`-` and `_` are interchangeable) or the
    /// numeric discriminant.
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.parse::<u8>() {
            return Self::try_from(n).map_err(|_| Error::ParseType(s.to_owned()));
        }
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "wsssession" {
            return Ok(Self::WssSession);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::ParseType(s.to_owned()))
    }
}
