use std::{env, fmt::Display, str::FromStr};

use dotenvy::dotenv;
use tracing::{info, warn};

/// Server configuration, read from `.env` and the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        Self {
            database_url: require("DATABASE_URL"),
            pool_size: try_load("DB_POOL_SIZE", "8"),
        }
    }
}

fn require(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("Environment variable {key} not found");
        panic!("{key} must be set in .env");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
