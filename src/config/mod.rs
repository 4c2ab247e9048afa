//! Configuration management module
//!
//! Loads settings from environment variables and .env files, and builds
//! the AWS clients derived from them.

pub mod aws;
pub mod settings;

pub use aws::{create_dynamodb_client, AwsConfigBuilder};
pub use settings::{Environment, Settings, TableThroughput};
