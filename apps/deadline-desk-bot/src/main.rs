use dotenvy::dotenv;
use teloxide::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod services;
mod state;

use crate::config::BotConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deadline_desk_bot=info,deadline_desk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DeadlineDesk Bot...");

    let config = BotConfig::load()?;
    tracing::info!("Operator: {}", config.operator_id);
    tracing::info!("Deliverables dir: {}", config.deliverables_dir.display());

    let state = AppState::new(&config)?;
    let bot = Bot::new(config.bot_token.clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    bot::run_bot(bot, shutdown_rx, state).await;
    Ok(())
}
