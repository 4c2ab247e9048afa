//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations.

pub mod flashcards;
pub mod health;
