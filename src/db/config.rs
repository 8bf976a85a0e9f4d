use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub primary_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, DbConfigError> {
        let primary_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(DbConfigError::Missing {
                key: "DATABASE_URL",
            })?;

        let max_connections = env_u64("DB_MAX_CONNECTIONS", 10).clamp(1, 1000) as u32;
        let acquire_timeout = Duration::from_millis(env_u64("DB_ACQUIRE_TIMEOUT_MS", 5000));
        let run_migrations = env_bool("DB_RUN_MIGRATIONS", false);

        Ok(Self {
            primary_url,
            max_connections,
            acquire_timeout,
            run_migrations,
        })
    }
}

#[derive(Debug, Error)]
pub enum DbConfigError {
    #[error("missing env var: {key}")]
    Missing { key: &'static str },
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
