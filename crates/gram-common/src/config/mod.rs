//! Environment-backed configuration

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BotConfig, ConfigError, DatabaseConfig, Environment, LevelingConfig,
    MediaConfig, ScheduleConfig, StorageConfig, TaggingConfig,
};
