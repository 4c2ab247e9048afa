//! Flashcard storage library
//!
//! A DynamoDB data-access layer for users, cards, decks and collections,
//! plus an in-memory collection store served over a JSON API.

// Public modules
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use db::{DynamoDbDao, DynamoDbDataService};
pub use error::{ApiError, DataError};
pub use server::App;
pub use services::{DataService, FakeDataService};
