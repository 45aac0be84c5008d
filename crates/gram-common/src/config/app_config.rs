//! Application configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).

use chrono_tz::Tz;
use gram_core::{ExtensionPolicy, Snowflake};
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
    pub leveling: LevelingConfig,
    pub tagging: TaggingConfig,
    pub schedule: ScheduleConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Platform connection configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub guild_id: Snowflake,
    /// The single moderated channel the bot archives
    pub channel_id: Snowflake,
    pub gateway_url: String,
    pub api_base: String,
    pub cdn_base: String,
    /// Public base URL of the archive web frontend, used in profile links
    pub web_base_url: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// File storage roots for mirrored artifacts
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub attachments_dir: String,
    pub avatars_dir: String,
    pub emoji_dir: String,
    pub levels_dir: String,
}

/// Media derivation configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Font used for the numeral on level-role icons
    pub font_file: String,
    /// Template image the numeral is drawn onto
    pub level_template: String,
    pub ffmpeg_path: String,
    pub extensions: ExtensionPolicy,
}

/// Level-role configuration
#[derive(Debug, Clone)]
pub struct LevelingConfig {
    /// Role names are `"{role_prefix} {streak}"`
    pub role_prefix: String,
}

/// Keyword auto-tagging configuration
#[derive(Debug, Clone)]
pub struct TaggingConfig {
    /// Path of the `pattern=emoji` rules file loaded at startup
    pub rules_file: String,
}

/// Daily reconciliation schedule
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// IANA timezone whose midnight triggers the daily pass
    pub timezone: Tz,
}

// Default value functions
fn default_app_name() -> String {
    "gram-bot".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_cdn_base() -> String {
    "https://cdn.discordapp.com".to_string()
}

fn default_web_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_attachments_dir() -> String {
    "data/attachments".to_string()
}

fn default_avatars_dir() -> String {
    "data/avatars".to_string()
}

fn default_emoji_dir() -> String {
    "data/emoji".to_string()
}

fn default_levels_dir() -> String {
    "data/levels".to_string()
}

fn default_font_file() -> String {
    "assets/level_font.ttf".to_string()
}

fn default_level_template() -> String {
    "assets/level_template.png".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_role_prefix() -> String {
    "niveau".to_string()
}

fn default_rules_file() -> String {
    "reactions.txt".to_string()
}

fn default_image_extensions() -> Vec<String> {
    vec![".png".into(), ".jpg".into(), ".jpeg".into(), ".gif".into()]
}

fn default_video_extensions() -> Vec<String> {
    vec![".mp4".into(), ".mov".into(), ".avi".into()]
}

fn default_audio_extensions() -> Vec<String> {
    vec![".mp3".into(), ".wav".into(), ".ogg".into()]
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// unparseable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            bot: BotConfig {
                token: required("GRAM_BOT_TOKEN")?,
                guild_id: required_snowflake("GRAM_GUILD_ID")?,
                channel_id: required_snowflake("GRAM_CHANNEL_ID")?,
                gateway_url: env::var("GRAM_GATEWAY_URL")
                    .unwrap_or_else(|_| default_gateway_url()),
                api_base: env::var("GRAM_API_BASE").unwrap_or_else(|_| default_api_base()),
                cdn_base: env::var("GRAM_CDN_BASE").unwrap_or_else(|_| default_cdn_base()),
                web_base_url: env::var("GRAM_WEB_BASE_URL")
                    .unwrap_or_else(|_| default_web_base_url()),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
            storage: StorageConfig {
                attachments_dir: env::var("GRAM_ATTACHMENTS_DIR")
                    .unwrap_or_else(|_| default_attachments_dir()),
                avatars_dir: env::var("GRAM_AVATARS_DIR")
                    .unwrap_or_else(|_| default_avatars_dir()),
                emoji_dir: env::var("GRAM_EMOJI_DIR").unwrap_or_else(|_| default_emoji_dir()),
                levels_dir: env::var("GRAM_LEVELS_DIR").unwrap_or_else(|_| default_levels_dir()),
            },
            media: MediaConfig {
                font_file: env::var("GRAM_FONT_FILE").unwrap_or_else(|_| default_font_file()),
                level_template: env::var("GRAM_LEVEL_TEMPLATE")
                    .unwrap_or_else(|_| default_level_template()),
                ffmpeg_path: env::var("GRAM_FFMPEG_PATH")
                    .unwrap_or_else(|_| default_ffmpeg_path()),
                extensions: ExtensionPolicy::new(
                    env_list("GRAM_IMAGE_EXTENSIONS", default_image_extensions),
                    env_list("GRAM_VIDEO_EXTENSIONS", default_video_extensions),
                    env_list("GRAM_AUDIO_EXTENSIONS", default_audio_extensions),
                ),
            },
            leveling: LevelingConfig {
                role_prefix: env::var("GRAM_ROLE_PREFIX")
                    .unwrap_or_else(|_| default_role_prefix()),
            },
            tagging: TaggingConfig {
                rules_file: env::var("GRAM_RULES_FILE").unwrap_or_else(|_| default_rules_file()),
            },
            schedule: ScheduleConfig {
                timezone: match env::var("GRAM_TIMEZONE") {
                    Ok(raw) => raw
                        .parse::<Tz>()
                        .map_err(|_| ConfigError::InvalidValue("GRAM_TIMEZONE", raw))?,
                    Err(_) => chrono_tz::Europe::Paris,
                },
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn required_snowflake(name: &'static str) -> Result<Snowflake, ConfigError> {
    let raw = required(name)?;
    Snowflake::parse(&raw).map_err(|_| ConfigError::InvalidValue(name, raw))
}

fn env_list(name: &str, default: fn() -> Vec<String>) -> Vec<String> {
    env::var(name)
        .ok()
        .map(|raw| parse_list(&raw))
        .unwrap_or_else(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
