//! Small immutable domain types: ids and the attachment extension policy

mod extension_policy;
mod snowflake;

pub use extension_policy::ExtensionPolicy;
pub use snowflake::{InvalidSnowflake, Snowflake, SnowflakeGenerator};
