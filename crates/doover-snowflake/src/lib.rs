//! Snowflake IDs for the Doover platform.
//!
//! A [`DooverSnowflakeId`] is a 64-bit, time-sortable identifier:
//!
//! ```text
//!  Bit Index:  63           22 21   18 17       8 7    4 3    0
//!              +--------------+-------+----------+------+------+
//!  Field:      | timestamp(42)| reg(4)| inst(10) |typ(4)|rnd(4)|
//!              +--------------+-------+----------+------+------+
//! ```
//!
//! The timestamp counts milliseconds since [`DOOVER_EPOCH`] (2025-01-01 UTC).
//! The random field comes from a shuffled cycle of `0..=15` shared by the
//! whole process, so up to sixteen IDs minted in the same millisecond for
//! the same origin and kind never collide.
//!
//! ```
//! use doover_snowflake::{generate_snowflake_id, SnowflakeType};
//!
//! let id = generate_snowflake_id(SnowflakeType::Message, 0, 0)?;
//! assert_eq!(id.kind()?, SnowflakeType::Message);
//! # Ok::<(), doover_snowflake::Error>(())
//! ```
//!
//! Listings that filter by ID take cursors built with [`cursor_at`] or
//! [`MessageWindow`].
//!
//! ## Features
//! - `chrono`: [`ToUnixMillis`] for `chrono::DateTime` and
//!   `DooverSnowflakeId::datetime`
//! - `serde`: native-integer (de)serialization plus the `as_string_id`
//!   adapter
//! - `tracing`: trace spans around generation and debug events on rejected
//!   input

mod error;
mod generator;
mod id;
mod kind;
mod random;
#[cfg(feature = "serde")]
mod serde;
mod time;
mod window;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::kind::*;
pub use crate::random::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
pub use crate::window::*;
