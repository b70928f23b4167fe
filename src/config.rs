use std::{str::FromStr, time::Duration};

use crate::errors::ServerError;

/// Where the todo table lives and how to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            )
        } else {
            format!(
                "mysql://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            )
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub run_migrations: bool,
    pub database: DatabaseConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let pool_size = parsed(&lookup, "DB_POOL_SIZE", 10)?;
        if pool_size == 0 {
            return Err(ServerError::EnvironmentError(String::from(
                "DB_POOL_SIZE must be at least 1",
            )));
        }

        Ok(Config {
            bind_address: text("BIND_ADDRESS", "127.0.0.1"),
            port: parsed(&lookup, "PORT", 5000)?,
            run_migrations: parsed(&lookup, "RUN_MIGRATIONS", false)?,
            database: DatabaseConfig {
                host: text("DB_HOST", "localhost"),
                port: parsed(&lookup, "DB_PORT", 3306)?,
                database: text("DB_NAME", "tododb"),
                user: text("DB_USER", "root"),
                password: text("DB_PASSWORD", ""),
                pool_size,
                connect_timeout: Duration::from_secs(parsed(
                    &lookup,
                    "DB_CONNECT_TIMEOUT_SECS",
                    5,
                )?),
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ServerError::EnvironmentError(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}
