//! Environment configuration.

use std::time::Duration;
use thiserror::Error;

/// Default pause before the bot replies, matching the browser front end
const DEFAULT_BOT_DELAY_MS: u64 = 500;

/// Default number of demo sessions run side by side
const DEFAULT_DEMO_GAMES: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Cosmetic pause between a human move and the bot's reply
    pub bot_delay: Duration,
    pub demo_games: usize,
    /// Base seed for reproducible demo games; entropy when unset
    pub demo_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bot_delay: Duration::from_millis(DEFAULT_BOT_DELAY_MS),
            demo_games: DEFAULT_DEMO_GAMES,
            demo_seed: None,
        }
    }
}

impl SessionConfig {
    /// Read `TICTACTOE_BOT_DELAY_MS`, `TICTACTOE_DEMO_GAMES` and `TICTACTOE_DEMO_SEED`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("TICTACTOE_BOT_DELAY_MS") {
            let ms = parse(&value, "TICTACTOE_BOT_DELAY_MS")?;
            config.bot_delay = Duration::from_millis(ms);
        }
        if let Some(value) = lookup("TICTACTOE_DEMO_GAMES") {
            config.demo_games = parse(&value, "TICTACTOE_DEMO_GAMES")?;
        }
        if let Some(value) = lookup("TICTACTOE_DEMO_SEED") {
            config.demo_seed = Some(parse(&value, "TICTACTOE_DEMO_SEED")?);
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
