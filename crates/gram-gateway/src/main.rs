//! gram entry point
//!
//! ```bash
//! cargo run -p gram-gateway
//! ```
//!
//! Everything is configured through the environment; a `.env` file is
//! honored, including for `APP_ENV` and `RUST_LOG`.

use gram_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_env()) {
        eprintln!("tracing setup failed: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "gram stopped");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    info!(
        environment = ?config.app.env,
        guild = %config.bot.guild_id,
        channel = %config.bot.channel_id,
        timezone = %config.schedule.timezone,
        "gram starting"
    );

    gram_gateway::run(config).await?;
    Ok(())
}
