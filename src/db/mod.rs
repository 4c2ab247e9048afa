//! Database module
//!
//! Contains the DynamoDB table access layer and the persisted entity store.

pub mod data_service;
pub mod dynamodb;
pub mod models;

pub use data_service::{DynamoDbDataService, TableNames};
pub use dynamodb::{
    build_update_expression, id_key, DynamoDbDao, FieldMap, IndexDefinition, IndexType, Item,
    UpdateExpression,
};
pub use models::{Card, Collection, Deck, User};
