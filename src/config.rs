use dotenvy::dotenv;
use std::{env, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Service configuration, read once at startup and handed to the router.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub page_size: u64,
    pub max_page_size: u64,
    pub admin: Option<AdminCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let admin = match (
            optional("ADMIN_USERNAME"),
            optional("ADMIN_EMAIL"),
            optional("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminCredentials {
                username,
                email,
                password,
            }),
            _ => None,
        };

        let config = Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_owned()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24)?,
            page_size: parsed("PAGE_SIZE", 12)?,
            max_page_size: parsed("MAX_PAGE_SIZE", 100)?,
            admin,
        };

        if config.page_size == 0 || config.max_page_size < config.page_size {
            return Err(ConfigError::Invalid {
                name: "PAGE_SIZE",
                value: config.page_size.to_string(),
            });
        }

        tracing::info!(bind_addr = %config.bind_addr, "Config loaded");
        Ok(config)
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
