//! Platform-facing edge of the bot
//!
//! Owns the websocket session, the REST adapter behind the [`Platform`]
//! trait, the event router, and the daily reconciliation scheduler. The
//! [`run`] entry point wires the archive, media pipeline, and services
//! together and then holds the gateway connection open.
//!
//! [`Platform`]: gram_core::Platform

pub mod connection;
pub mod error;
pub mod protocol;
pub mod rest;
pub mod router;
pub mod scheduler;

pub use connection::GatewayClient;
pub use error::GatewayError;
pub use rest::HttpPlatform;
pub use router::EventRouter;
pub use scheduler::ReconcileScheduler;

use std::sync::Arc;

use tracing::{info, warn};

use gram_common::AppConfig;
use gram_core::SnowflakeGenerator;
use gram_db::{create_pool, ensure_schema, PgArchive};
use gram_media::{BadgeRenderer, HttpFetcher};
use gram_service::services::TagRules;
use gram_service::ServiceContextBuilder;

/// Wire every dependency and run the bot until the process is stopped
///
/// # Errors
/// Returns an error when the database, media pipeline, or platform
/// client cannot be brought up. Gateway disconnects after startup are
/// retried, not returned.
pub async fn run(config: AppConfig) -> Result<(), GatewayError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| GatewayError::Database(e.to_string()))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| GatewayError::Database(e.to_string()))?;
    info!("Database connection established");

    let store = Arc::new(PgArchive::new(pool));
    let fetcher = Arc::new(HttpFetcher::new()?);
    let badges = Arc::new(BadgeRenderer::new(
        &config.media.level_template,
        &config.media.font_file,
        &config.storage.levels_dir,
    )?);

    let rules = match TagRules::load(&config.tagging.rules_file) {
        Ok(rules) => {
            info!(rules = rules.len(), "Tag rules loaded");
            rules
        }
        Err(error) => {
            warn!(
                file = %config.tagging.rules_file,
                %error,
                "Tag rules unavailable; keyword tagging disabled"
            );
            TagRules::default()
        }
    };

    let platform = Arc::new(HttpPlatform::new(&config.bot)?);

    let ctx = ServiceContextBuilder::new()
        .store(store)
        .platform(platform.clone())
        .fetcher(fetcher)
        .badges(badges)
        .ids(Arc::new(SnowflakeGenerator::new(0)))
        .rules(Arc::new(rules))
        .bot(config.bot.clone())
        .storage(config.storage)
        .media(config.media)
        .leveling(config.leveling)
        .timezone(config.schedule.timezone)
        .build()?;

    let router = EventRouter::new(ctx.clone());
    tokio::spawn(ReconcileScheduler::new(ctx).run());

    GatewayClient::new(config.bot, platform, router).run().await
}
