//! Generic DynamoDB table access
//!
//! `DynamoDbDao` wraps the AWS SDK client with table-level CRUD keyed by a
//! single `id` hash key. It is built once and shared; nothing here mutates
//! SDK configuration per call.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType,
    Projection, ProjectionType, ProvisionedThroughput, ReturnValue, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbSdkClient;
use std::collections::HashMap;

use crate::config::TableThroughput;
use crate::error::DataError;

/// Hash key attribute shared by every table
pub const ID_ATTRIBUTE: &str = "id";

/// A DynamoDB item (row)
pub type Item = HashMap<String, AttributeValue>;

/// Ordered field assignments for a single update group
pub type FieldMap = Vec<(String, AttributeValue)>;

/// Attribute type of a secondary index key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    String,
    Number,
}

impl From<IndexType> for ScalarAttributeType {
    fn from(value: IndexType) -> Self {
        match value {
            IndexType::String => ScalarAttributeType::S,
            IndexType::Number => ScalarAttributeType::N,
        }
    }
}

/// A non-unique global secondary index on a single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub attribute_type: IndexType,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, attribute_type: IndexType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }
}

/// Build a single-attribute `id` key.
pub fn id_key(id: impl Into<String>) -> Item {
    HashMap::from([(ID_ATTRIBUTE.to_string(), AttributeValue::S(id.into()))])
}

/// A `SET` update expression with its placeholder maps
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Build `SET #0 = :0, #1 = :1, ...` from an ordered list of field groups.
///
/// Placeholders are numbered across all groups in iteration order. Repeated
/// field names are not merged.
pub fn build_update_expression(updates: &[FieldMap]) -> Result<UpdateExpression, DataError> {
    let mut assignments = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    for (n, (field, value)) in updates.iter().flatten().enumerate() {
        assignments.push(format!("#{n} = :{n}"));
        names.insert(format!("#{n}"), field.clone());
        values.insert(format!(":{n}"), value.clone());
    }

    if assignments.is_empty() {
        return Err(DataError::InvalidInput(
            "update requires at least one field".to_string(),
        ));
    }

    Ok(UpdateExpression {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    })
}

/// Table-level CRUD over DynamoDB
#[derive(Clone)]
pub struct DynamoDbDao {
    client: DynamoDbSdkClient,
    throughput: TableThroughput,
}

impl DynamoDbDao {
    pub fn new(client: DynamoDbSdkClient, throughput: TableThroughput) -> Self {
        Self { client, throughput }
    }

    /// Get a reference to the underlying AWS SDK client
    pub fn client(&self) -> &DynamoDbSdkClient {
        &self.client
    }

    /// Create a table keyed by `id`, adding one GSI per index definition.
    pub async fn create_table(
        &self,
        name: &str,
        indexes: &[IndexDefinition],
    ) -> Result<(), DataError> {
        let mut request = self
            .client
            .create_table()
            .table_name(name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(ID_ATTRIBUTE)
                    .key_type(KeyType::Hash)
                    .build()
                    .map_err(build_error)?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(ID_ATTRIBUTE)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(build_error)?,
            )
            .provisioned_throughput(self.throughput(self.throughput.write_capacity_units)?);

        for index in indexes {
            request = request
                .attribute_definitions(
                    AttributeDefinition::builder()
                        .attribute_name(&index.name)
                        .attribute_type(index.attribute_type.into())
                        .build()
                        .map_err(build_error)?,
                )
                .global_secondary_indexes(
                    GlobalSecondaryIndex::builder()
                        .index_name(&index.name)
                        .key_schema(
                            KeySchemaElement::builder()
                                .attribute_name(&index.name)
                                .key_type(KeyType::Hash)
                                .build()
                                .map_err(build_error)?,
                        )
                        .projection(
                            Projection::builder()
                                .projection_type(ProjectionType::KeysOnly)
                                .build(),
                        )
                        .provisioned_throughput(
                            self.throughput(self.throughput.index_write_capacity_units)?,
                        )
                        .build()
                        .map_err(build_error)?,
                );
        }

        request.send().await.map_err(|e| {
            tracing::error!(table = %name, error = %e, "Unable to create table");
            DataError::DynamoDb(e.to_string())
        })?;

        tracing::info!(table = %name, indexes = indexes.len(), "Created table");

        Ok(())
    }

    pub async fn drop_table(&self, name: &str) -> Result<(), DataError> {
        self.client
            .delete_table()
            .table_name(name)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %name, error = %e, "Unable to drop table");
                DataError::DynamoDb(e.to_string())
            })?;

        tracing::info!(table = %name, "Dropped table");

        Ok(())
    }

    /// Put the merged key and fields as a full item, replacing any existing row.
    pub async fn insert(&self, table: &str, key: Item, fields: Item) -> Result<Item, DataError> {
        let mut item = key;
        item.extend(fields);

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item.clone()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "Unable to add item");
                DataError::DynamoDb(e.to_string())
            })?;

        tracing::debug!(table = %table, "Inserted item");

        Ok(item)
    }

    /// Apply `SET` assignments and return the updated row.
    pub async fn update(
        &self,
        table: &str,
        key: Item,
        updates: &[FieldMap],
    ) -> Result<Item, DataError> {
        let update = build_update_expression(updates)?;

        let result = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "Unable to update item");
                DataError::DynamoDb(e.to_string())
            })?;

        Ok(result.attributes.unwrap_or_default())
    }

    /// Delete a row, returning it if it existed.
    pub async fn delete(&self, table: &str, key: Item) -> Result<Option<Item>, DataError> {
        let result = self
            .client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "Unable to delete item");
                DataError::DynamoDb(e.to_string())
            })?;

        Ok(result.attributes)
    }

    pub async fn find_one(&self, table: &str, key: Item) -> Result<Option<Item>, DataError> {
        let result = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "Unable to read item");
                DataError::DynamoDb(e.to_string())
            })?;

        Ok(result.item)
    }

    pub async fn list_tables(&self) -> Result<Vec<String>, DataError> {
        let result = self
            .client
            .list_tables()
            .send()
            .await
            .map_err(|e| DataError::DynamoDb(e.to_string()))?;

        Ok(result.table_names.unwrap_or_default())
    }

    /// Check if the DynamoDB connection is healthy
    pub async fn health_check(&self) -> bool {
        match self.client.list_tables().limit(1).send().await {
            Ok(_) => {
                tracing::debug!("DynamoDB health check passed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "DynamoDB health check failed");
                false
            }
        }
    }

    fn throughput(&self, write_capacity_units: i64) -> Result<ProvisionedThroughput, DataError> {
        ProvisionedThroughput::builder()
            .read_capacity_units(self.throughput.read_capacity_units)
            .write_capacity_units(write_capacity_units)
            .build()
            .map_err(build_error)
    }
}

fn build_error(err: aws_sdk_dynamodb::error::BuildError) -> DataError {
    DataError::InvalidInput(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_string())
    }

    #[test]
    fn test_update_expression_numbers_fields_in_order() {
        let updates = vec![
            vec![("q".to_string(), s("Q?")), ("a".to_string(), s("A"))],
            vec![("d".to_string(), AttributeValue::N("5".to_string()))],
        ];

        let update = build_update_expression(&updates).unwrap();

        assert_eq!(update.expression, "SET #0 = :0, #1 = :1, #2 = :2");
        assert_eq!(update.names["#0"], "q");
        assert_eq!(update.names["#2"], "d");
        assert_eq!(update.values[":1"], s("A"));
    }

    #[test]
    fn test_update_expression_keeps_duplicates() {
        let updates = vec![
            vec![("n".to_string(), s("first"))],
            vec![("n".to_string(), s("second"))],
        ];

        let update = build_update_expression(&updates).unwrap();

        assert_eq!(update.expression, "SET #0 = :0, #1 = :1");
        assert_eq!(update.names["#0"], "n");
        assert_eq!(update.names["#1"], "n");
    }

    #[test]
    fn test_update_expression_rejects_empty() {
        assert!(matches!(
            build_update_expression(&[]),
            Err(DataError::InvalidInput(_))
        ));
        assert!(build_update_expression(&[vec![]]).is_err());
    }

    #[test]
    fn test_id_key() {
        let key = id_key("abc");
        assert_eq!(key.len(), 1);
        assert_eq!(key[ID_ATTRIBUTE], s("abc"));
    }

    #[test]
    fn test_index_type_mapping() {
        assert_eq!(
            ScalarAttributeType::from(IndexType::String),
            ScalarAttributeType::S
        );
        assert_eq!(
            ScalarAttributeType::from(IndexType::Number),
            ScalarAttributeType::N
        );
    }
}
