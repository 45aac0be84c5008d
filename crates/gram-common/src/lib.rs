//! # gram-common
//!
//! Environment configuration and the tracing bootstrap, shared by every
//! other crate in the workspace.

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, AppSettings, BotConfig, ConfigError, DatabaseConfig, Environment, LevelingConfig,
    MediaConfig, ScheduleConfig, StorageConfig, TaggingConfig,
};
pub use telemetry::{try_init_tracing_with_config, LogFormat, TracingConfig, TracingError};
