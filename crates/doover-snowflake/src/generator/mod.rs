mod global;
mod origin;
mod snowflake;

pub use global::*;
pub use origin::*;
pub use snowflake::*;
