use core::fmt;
use core::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{DOOVER_EPOCH_MILLIS, Error, Result, SnowflakeType};

/// A 64-bit Doover snowflake ID
///
/// - 42 bits timestamp (ms since [`DOOVER_EPOCH`])
/// - 4 bits region ID
/// - 10 bits instance ID
/// - 4 bits type ID ([`SnowflakeType`])
/// - 4 bits random
///
/// ```text
///  Bit Index:  63             22 21          18 17            8 7          4 3           0
///              +----------------+--------------+---------------+------------+------------+
///  Field:      | timestamp (42) | region ID (4)| instance (10) | type ID (4)| random (4) |
///              +----------------+--------------+---------------+------------+------------+
///              |<----- MSB ------------------- 64 bits ------------------------ LSB ---->|
/// ```
///
/// Every `u64` is a well-formed packing, so [`DooverSnowflakeId::from_raw`]
/// is total. IDs order by timestamp first, which makes them usable as
/// range-query cursors.
///
/// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DooverSnowflakeId {
    id: u64,
}

impl DooverSnowflakeId {
    /// Bitmask for the 42-bit timestamp field. Occupies bits 22 through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << 42) - 1;

    /// Bitmask for the 4-bit region ID field. Occupies bits 18 through 21.
    pub const REGION_ID_MASK: u64 = (1 << 4) - 1;

    /// Bitmask for the 10-bit instance ID field. Occupies bits 8 through 17.
    pub const INSTANCE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for the 4-bit type ID field. Occupies bits 4 through 7.
    pub const TYPE_ID_MASK: u64 = (1 << 4) - 1;

    /// Bitmask for the 4-bit random field. Occupies bits 0 through 3.
    pub const RANDOM_MASK: u64 = (1 << 4) - 1;

    pub const TIMESTAMP_SHIFT: u64 = 22;
    pub const REGION_ID_SHIFT: u64 = 18;
    pub const INSTANCE_ID_SHIFT: u64 = 8;
    pub const TYPE_ID_SHIFT: u64 = 4;
    pub const RANDOM_SHIFT: u64 = 0;

    /// Packs the five fields, masking each one to its width.
    ///
    /// Out-of-range bits are discarded rather than bleeding into the
    /// neighbouring field. Use [`Self::try_from_components`] to reject them
    /// instead.
    pub const fn from(
        timestamp: u64,
        region_id: u64,
        instance_id: u64,
        type_id: u64,
        random: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let region_id = (region_id & Self::REGION_ID_MASK) << Self::REGION_ID_SHIFT;
        let instance_id = (instance_id & Self::INSTANCE_ID_MASK) << Self::INSTANCE_ID_SHIFT;
        let type_id = (type_id & Self::TYPE_ID_MASK) << Self::TYPE_ID_SHIFT;
        let random = (random & Self::RANDOM_MASK) << Self::RANDOM_SHIFT;
        Self {
            id: timestamp | region_id | instance_id | type_id | random,
        }
    }

    /// Packs the five fields, failing if any of them is wider than its slot.
    ///
    /// # Errors
    ///
    /// Returns the `*Overflow` variant of [`Error`] naming the first field
    /// that does not fit.
    pub fn try_from_components(
        timestamp: u64,
        region_id: u64,
        instance_id: u64,
        type_id: u64,
        random: u64,
    ) -> Result<Self> {
        if timestamp > Self::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow {
                timestamp,
                max: Self::TIMESTAMP_MASK,
            });
        }
        check_region_id(region_id)?;
        check_instance_id(instance_id)?;
        if type_id > Self::TYPE_ID_MASK {
            return Err(Error::TypeIdOverflow {
                type_id,
                max: Self::TYPE_ID_MASK,
            });
        }
        if random > Self::RANDOM_MASK {
            return Err(Error::RandomOverflow {
                random,
                max: Self::RANDOM_MASK,
            });
        }
        Ok(Self::from(timestamp, region_id, instance_id, type_id, random))
    }

    /// The smallest ID any generator can mint at `timestamp`.
    ///
    /// All lower fields are zero, so this sorts before every real ID created
    /// in that millisecond and after every ID created earlier.
    pub const fn lowest_at(timestamp: u64) -> Self {
        Self::from(timestamp, 0, 0, 0, 0)
    }

    /// Returns a copy with the random field replaced.
    pub const fn with_random(self, random: u64) -> Self {
        let cleared = self.id & !(Self::RANDOM_MASK << Self::RANDOM_SHIFT);
        Self {
            id: cleared | ((random & Self::RANDOM_MASK) << Self::RANDOM_SHIFT),
        }
    }

    /// Extracts the timestamp (ms since [`DOOVER_EPOCH`]).
    ///
    /// [`DOOVER_EPOCH`]: crate::DOOVER_EPOCH
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the region ID.
    pub const fn region_id(&self) -> u64 {
        (self.id >> Self::REGION_ID_SHIFT) & Self::REGION_ID_MASK
    }

    /// Extracts the instance ID.
    pub const fn instance_id(&self) -> u64 {
        (self.id >> Self::INSTANCE_ID_SHIFT) & Self::INSTANCE_ID_MASK
    }

    /// Extracts the raw type discriminant.
    pub const fn type_id(&self) -> u64 {
        (self.id >> Self::TYPE_ID_SHIFT) & Self::TYPE_ID_MASK
    }

    /// Extracts the random disambiguator.
    pub const fn random(&self) -> u64 {
        (self.id >> Self::RANDOM_SHIFT) & Self::RANDOM_MASK
    }

    /// Decodes the type discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for the unassigned values `7..=15`.
    pub fn kind(&self) -> Result<SnowflakeType> {
        SnowflakeType::try_from(self.type_id() as u8)
    }

    /// Milliseconds since the Unix epoch at which this ID was minted.
    pub const fn unix_millis(&self) -> u64 {
        self.timestamp() + DOOVER_EPOCH_MILLIS
    }

    /// The instant encoded in the timestamp field.
    pub fn created_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.unix_millis())
    }

    /// The instant encoded in the timestamp field, in UTC.
    #[cfg(feature = "chrono")]
    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        // A 42-bit offset from 2025 is far inside chrono's range.
        chrono::DateTime::from_timestamp_millis(self.unix_millis() as i64).unwrap_or_default()
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts
    /// lexicographically in the same order as the numeric value.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }

    fn fields(&self) -> [FieldLayout; 5] {
        [
            FieldLayout {
                name: "timestamp",
                bits: 42,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "region_id",
                bits: 4,
                value: self.region_id(),
            },
            FieldLayout {
                name: "instance_id",
                bits: 10,
                value: self.instance_id(),
            },
            FieldLayout {
                name: "type_id",
                bits: 4,
                value: self.type_id(),
            },
            FieldLayout {
                name: "random",
                bits: 4,
                value: self.random(),
            },
        ]
    }
}

pub(crate) fn check_region_id(region_id: u64) -> Result<()> {
    if region_id > DooverSnowflakeId::REGION_ID_MASK {
        return Err(Error::RegionIdOverflow {
            region_id,
            max: DooverSnowflakeId::REGION_ID_MASK,
        });
    }
    Ok(())
}

pub(crate) fn check_instance_id(instance_id: u64) -> Result<()> {
    if instance_id > DooverSnowflakeId::INSTANCE_ID_MASK {
        return Err(Error::InstanceIdOverflow {
            instance_id,
            max: DooverSnowflakeId::INSTANCE_ID_MASK,
        });
    }
    Ok(())
}

impl From<u64> for DooverSnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<DooverSnowflakeId> for u64 {
    fn from(id: DooverSnowflakeId) -> Self {
        id.to_raw()
    }
}

impl FromStr for DooverSnowflakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::from_raw(s.trim().parse::<u64>()?))
    }
}

impl fmt::Display for DooverSnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for DooverSnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return f
                .debug_struct("DooverSnowflakeId")
                .field("id", &self.id)
                .field("timestamp", &self.timestamp())
                .field("region_id", &self.region_id())
                .field("instance_id", &self.instance_id())
                .field("type_id", &self.type_id())
                .field("random", &self.random())
                .finish();
        }
        write_bit_layout_debug(f, self)
    }
}

struct FieldLayout {
    name: &'static str,
    bits: u8,
    value: u64,
}

/// Renders the `{:#?}` form: raw value plus a table of the packed fields.
fn write_bit_layout_debug(f: &mut fmt::Formatter<'_>, id: &DooverSnowflakeId) -> fmt::Result {
    let fields = id.fields();

    // Column width: widest of label, decimal and hex, plus padding
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    fn center(s: impl ToString, width: usize) -> String {
        let s = s.to_string();
        let pad = width.saturating_sub(s.len());
        let left = pad / 2;
        format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
    }

    fn border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
        write!(f, "        +")?;
        for &w in columns {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    }

    fn row(
        f: &mut fmt::Formatter<'_>,
        cells: impl Iterator<Item = String>,
        columns: &[usize],
    ) -> fmt::Result {
        write!(f, "        |")?;
        for (cell, &w) in cells.zip(columns) {
            write!(f, "{}|", center(cell, w))?;
        }
        writeln!(f)
    }

    writeln!(f, "DooverSnowflakeId {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.id, id.id)?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    match id.kind() {
        Ok(kind) => writeln!(f, "    kind       : {kind}")?,
        Err(_) => writeln!(f, "    kind       : unassigned ({})", id.type_id())?,
    }
    writeln!(f, "    unix ms    : {}", id.unix_millis())?;
    writeln!(f, "    layout     :")?;

    border(f, &columns)?;
    row(
        f,
        fields.iter().map(|fl| format!("{} ({})", fl.name, fl.bits)),
        &columns,
    )?;
    border(f, &columns)?;
    row(f, fields.iter().map(|fl| fl.value.to_string()), &columns)?;
    row(f, fields.iter().map(|fl| format!("0x{:x}", fl.value)), &columns)?;
    border(f, &columns)?;

    write!(f, "}}")
}
