#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use dotenvy::dotenv;
use sleep_action::{server, utils::GlobalConfig};
use std::env;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let environment = Environment::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(environment.log_level())
        .json()
        .with_target(false)
        .flatten_event(true)
        .without_time()
        .init();

    tracing::info!("Starting sleep action runtime...");

    server::start(GlobalConfig::from_env()).await
}

#[derive(Debug, PartialEq, Eq)]
enum Environment {
    Production,
    Development,
}

impl TryFrom<&str> for Environment {
    type Error = eyre::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            _ => Err(eyre::eyre!("invalid `APP_ENV` environment variable: {s}")),
        }
    }
}

impl Environment {
    pub fn from_env() -> eyre::Result<Self> {
        env::var("APP_ENV")
            .unwrap_or_else(|_| "production".to_string())
            .trim()
            .try_into()
    }

    pub const fn log_level(&self) -> tracing::Level {
        match self {
            Self::Development => tracing::Level::DEBUG,
            Self::Production => tracing::Level::INFO,
        }
    }
}
