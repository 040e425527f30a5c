//! Tic-tac-toe session host.
//!
//! Runs a batch of independent games against the bot, side by side, with
//! the same reply delay the browser uses.

use std::sync::Arc;
use tictactoe_core::Player;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod demo;
mod protocol;
mod session;

use config::SessionConfig;
use demo::DemoOutcome;
use session::SessionHost;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env()?;
    info!(
        games = config.demo_games,
        bot_delay_ms = config.bot_delay.as_millis() as u64,
        seed = ?config.demo_seed,
        "Starting tic-tac-toe sessions..."
    );

    let host = Arc::new(SessionHost::new(config.bot_delay));

    // Every other game restarts while the bot's first reply is pending
    let handles: Vec<_> = (0..config.demo_games)
        .map(|n| {
            let seed = config.demo_seed.map(|base| base.wrapping_add(n as u64));
            tokio::spawn(demo::run_demo_session(Arc::clone(&host), seed, n % 2 == 1))
        })
        .collect();

    let (mut human_wins, mut bot_wins, mut draws) = (0, 0, 0);
    for handle in handles {
        match handle.await? {
            Ok(DemoOutcome::Won(Player::First)) => human_wins += 1,
            Ok(DemoOutcome::Won(Player::Second)) => bot_wins += 1,
            Ok(DemoOutcome::Draw) => draws += 1,
            Err(e) => error!("Demo session failed: {}", e),
        }
    }

    for session in host.list_sessions() {
        warn!(session = %session.id, status = %session.status_text, "Session left open");
    }

    info!(
        human_wins,
        bot_wins,
        draws,
        open_sessions = host.session_count(),
        "All sessions finished"
    );
    Ok(())
}
