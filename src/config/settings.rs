//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use crate::logging::LogFormat;
use crate::services::ClockMode;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development, staging, or production", s),
        }
    }
}

/// Provisioned throughput applied to created tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
    /// Write capacity for global secondary indexes
    pub index_write_capacity_units: i64,
}

impl Default for TableThroughput {
    fn default() -> Self {
        Self {
            read_capacity_units: 5,
            write_capacity_units: 5,
            index_write_capacity_units: 1,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,
    pub log_format: LogFormat,

    // Server settings
    pub host: String,
    pub port: u16,

    // AWS settings
    pub aws_region: String,
    pub dynamodb_endpoint_url: Option<String>,

    // DynamoDB tables
    /// Prepended to every table name, e.g. `dev-` gives `dev-User`
    pub dynamodb_table_prefix: String,
    pub throughput: TableThroughput,

    // In-memory backend
    pub clock_mode: ClockMode,
    /// Epoch seconds reported when `clock_mode` is frozen
    pub frozen_clock_seconds: i64,
    /// Bootstrap the six synthetic decks at startup
    pub seed_default_decks: bool,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let settings = Self {
            app_name: env_or_default("APP_NAME", "flashcard-store"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),
            log_format: env_or_default("LOG_FORMAT", "json")
                .parse()
                .context("Invalid LOG_FORMAT value")?,

            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8000")
                .parse()
                .context("Invalid PORT value")?,

            aws_region: env_or_default("AWS_REGION", "us-west-2"),
            dynamodb_endpoint_url: env::var("DYNAMODB_ENDPOINT_URL").ok(),

            dynamodb_table_prefix: env_or_default("DYNAMODB_TABLE_PREFIX", ""),
            throughput: TableThroughput {
                read_capacity_units: env_or_default("DYNAMODB_READ_CAPACITY", "5")
                    .parse()
                    .context("Invalid DYNAMODB_READ_CAPACITY value")?,
                write_capacity_units: env_or_default("DYNAMODB_WRITE_CAPACITY", "5")
                    .parse()
                    .context("Invalid DYNAMODB_WRITE_CAPACITY value")?,
                index_write_capacity_units: 1,
            },

            clock_mode: env_or_default("CLOCK_MODE", "frozen")
                .parse()
                .context("Invalid CLOCK_MODE value")?,
            frozen_clock_seconds: env_or_default("FROZEN_CLOCK_SECONDS", "1")
                .parse()
                .context("Invalid FROZEN_CLOCK_SECONDS value")?,
            seed_default_decks: parse_flag(&env_or_default("SEED_DEFAULT_DECKS", "true"))
                .context("Invalid SEED_DEFAULT_DECKS value")?,
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.throughput.read_capacity_units <= 0 || self.throughput.write_capacity_units <= 0 {
            anyhow::bail!("DynamoDB capacity units must be > 0");
        }

        if self.is_production() && self.clock_mode == ClockMode::Frozen {
            tracing::warn!("Running in production with a frozen clock; due dates will not advance");
        }

        Ok(())
    }

    /// Physical table name for a logical table
    pub fn table_name(&self, logical: &str) -> String {
        format!("{}{}", self.dynamodb_table_prefix, logical)
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "flashcard-store".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            host: "0.0.0.0".to_string(),
            port: 8000,
            aws_region: "us-west-2".to_string(),
            dynamodb_endpoint_url: None,
            dynamodb_table_prefix: String::new(),
            throughput: TableThroughput::default(),
            clock_mode: ClockMode::Frozen,
            frozen_clock_seconds: 1,
            seed_default_decks: true,
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag: `true`/`false`, `1`/`0` or `yes`/`no`
fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "flashcard-store");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.clock_mode, ClockMode::Frozen);
        assert_eq!(settings.frozen_clock_seconds, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("moon".parse::<Environment>().is_err());
    }

    #[test]
    fn test_table_name_prefix() {
        let mut settings = Settings::default();
        assert_eq!(settings.table_name("Card"), "Card");

        settings.dynamodb_table_prefix = "dev-".to_string();
        assert_eq!(settings.table_name("Card"), "dev-Card");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut settings = Settings::default();
        settings.throughput.read_capacity_units = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag(" YES ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(!parse_flag("false").unwrap());
        assert!(parse_flag("ture").is_err());
        assert!(parse_flag("").is_err());
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8000");
    }
}
