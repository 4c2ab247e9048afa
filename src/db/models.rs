//! DynamoDB data models
//!
//! Persisted entities and their flattened row representation. Row attribute
//! names are abbreviated (`q`, `a`, `d`, `n`, `c`) to keep items small.

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::db::dynamodb::{FieldMap, Item, ID_ATTRIBUTE};
use crate::error::DataError;

// Logical table names
pub const USER_TABLE: &str = "User";
pub const CARD_TABLE: &str = "Card";
pub const DECK_TABLE: &str = "Deck";
pub const COLLECTION_TABLE: &str = "Collection";

// Row attribute names
pub const USER_EMAIL: &str = "email";
pub const CARD_QUESTION: &str = "q";
pub const CARD_ANSWER: &str = "a";
pub const CARD_DUE: &str = "d";
pub const DECK_NAME: &str = "n";
pub const DECK_CARDS: &str = "c";
pub const COLLECTION_DECKS: &str = "d";

/// Application user.
///
/// Stored in the User table; `email` carries a non-unique secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<String>,
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
        }
    }

    /// Non-key attributes
    pub fn to_fields(&self) -> Item {
        Item::from([(USER_EMAIL.to_string(), AttributeValue::S(self.email.clone()))])
    }

    pub fn to_updates(&self) -> FieldMap {
        vec![(USER_EMAIL.to_string(), AttributeValue::S(self.email.clone()))]
    }

    pub fn from_dynamodb(item: &Item) -> Result<Self, DataError> {
        Ok(Self {
            id: Some(required_string(item, ID_ATTRIBUTE)?),
            email: required_string(item, USER_EMAIL)?,
        })
    }
}

/// Question/answer pair. Stored as `{id, q, a, d?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
    /// Epoch seconds; `None` for a card never reviewed
    pub due: Option<i64>,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, due: Option<i64>) -> Self {
        Self {
            id: None,
            question: question.into(),
            answer: answer.into(),
            due,
        }
    }

    /// Non-key attributes. `d` is omitted for new cards.
    pub fn to_fields(&self) -> Item {
        let mut item = Item::new();
        item.insert(CARD_QUESTION.to_string(), AttributeValue::S(self.question.clone()));
        item.insert(CARD_ANSWER.to_string(), AttributeValue::S(self.answer.clone()));
        if let Some(due) = self.due {
            item.insert(CARD_DUE.to_string(), AttributeValue::N(due.to_string()));
        }
        item
    }

    /// Update assignments. A cleared due date is written as NULL so a stale
    /// value does not survive the update.
    pub fn to_updates(&self) -> FieldMap {
        let due = match self.due {
            Some(due) => AttributeValue::N(due.to_string()),
            None => AttributeValue::Null(true),
        };
        vec![
            (CARD_QUESTION.to_string(), AttributeValue::S(self.question.clone())),
            (CARD_ANSWER.to_string(), AttributeValue::S(self.answer.clone())),
            (CARD_DUE.to_string(), due),
        ]
    }

    pub fn from_dynamodb(item: &Item) -> Result<Self, DataError> {
        Ok(Self {
            id: Some(required_string(item, ID_ATTRIBUTE)?),
            question: required_string(item, CARD_QUESTION)?,
            answer: required_string(item, CARD_ANSWER)?,
            due: get_number(item, CARD_DUE)?,
        })
    }
}

/// Named deck referencing its cards by id. Stored as `{id, n, c}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Option<String>,
    pub name: String,
    pub cards: Vec<String>,
}

impl Deck {
    pub fn new(name: impl Into<String>, cards: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            cards,
        }
    }

    pub fn to_fields(&self) -> Item {
        self.to_updates().into_iter().collect()
    }

    pub fn to_updates(&self) -> FieldMap {
        vec![
            (DECK_NAME.to_string(), AttributeValue::S(self.name.clone())),
            (DECK_CARDS.to_string(), string_list(&self.cards)),
        ]
    }

    pub fn from_dynamodb(item: &Item) -> Result<Self, DataError> {
        Ok(Self {
            id: Some(required_string(item, ID_ATTRIBUTE)?),
            name: required_string(item, DECK_NAME)?,
            cards: get_string_list(item, DECK_CARDS)?,
        })
    }
}

/// A user's decks. The id is the owning user's id. Stored as `{id, d}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Option<String>,
    pub decks: Vec<String>,
}

impl Collection {
    pub fn new(user_id: impl Into<String>, decks: Vec<String>) -> Self {
        Self {
            id: Some(user_id.into()),
            decks,
        }
    }

    pub fn to_fields(&self) -> Item {
        self.to_updates().into_iter().collect()
    }

    pub fn to_updates(&self) -> FieldMap {
        vec![(COLLECTION_DECKS.to_string(), string_list(&self.decks))]
    }

    pub fn from_dynamodb(item: &Item) -> Result<Self, DataError> {
        Ok(Self {
            id: Some(required_string(item, ID_ATTRIBUTE)?),
            decks: get_string_list(item, COLLECTION_DECKS)?,
        })
    }
}

// Helper functions for converting DynamoDB AttributeValues

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn required_string(item: &Item, key: &str) -> Result<String, DataError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| DataError::Parse(format!("missing string attribute '{}'", key)))
}

fn get_number(item: &Item, key: &str) -> Result<Option<i64>, DataError> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::N(n)) => n
            .parse()
            .map(Some)
            .map_err(|_| DataError::Parse(format!("attribute '{}' is not an integer: {}", key, n))),
        Some(_) => Err(DataError::Parse(format!("attribute '{}' is not a number", key))),
    }
}

fn get_string_list(item: &Item, key: &str) -> Result<Vec<String>, DataError> {
    match item.get(key) {
        None => Ok(Vec::new()),
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|v| {
                v.as_s()
                    .cloned()
                    .map_err(|_| DataError::Parse(format!("attribute '{}' holds a non-string", key)))
            })
            .collect(),
        // string sets are accepted for rows written by other tools
        Some(AttributeValue::Ss(values)) => Ok(values.clone()),
        Some(_) => Err(DataError::Parse(format!("attribute '{}' is not a list", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(id: &str, mut fields: Item) -> Item {
        fields.insert(ID_ATTRIBUTE.to_string(), AttributeValue::S(id.to_string()));
        fields
    }

    #[test]
    fn test_card_row_uses_abbreviated_fields() {
        let card = Card::new("Question 2?", "Answer 2?", Some(20999));
        let fields = card.to_fields();

        assert_eq!(fields[CARD_QUESTION].as_s().unwrap(), "Question 2?");
        assert_eq!(fields[CARD_ANSWER].as_s().unwrap(), "Answer 2?");
        assert_eq!(fields[CARD_DUE].as_n().unwrap(), "20999");
    }

    #[test]
    fn test_new_card_omits_due() {
        let card = Card::new("Question 1?", "Answer 1?", None);
        assert!(!card.to_fields().contains_key(CARD_DUE));

        let parsed = Card::from_dynamodb(&with_id("c1", card.to_fields())).unwrap();
        assert_eq!(parsed.due, None);
        assert_eq!(parsed.id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_card_update_clears_due_with_null() {
        let updates = Card::new("Q", "A", None).to_updates();
        assert_eq!(updates[2].0, CARD_DUE);
        assert_eq!(updates[2].1, AttributeValue::Null(true));

        let mut row = with_id("c1", Card::new("Q", "A", None).to_fields());
        row.insert(CARD_DUE.to_string(), AttributeValue::Null(true));
        assert_eq!(Card::from_dynamodb(&row).unwrap().due, None);
    }

    #[test]
    fn test_deck_row_lists_card_ids() {
        let deck = Deck::new("Spanish", vec!["c1".to_string(), "c2".to_string()]);
        let row = with_id("d1", deck.to_fields());

        assert_eq!(row[DECK_NAME].as_s().unwrap(), "Spanish");
        assert_eq!(row[DECK_CARDS].as_l().unwrap().len(), 2);

        let parsed = Deck::from_dynamodb(&row).unwrap();
        assert_eq!(parsed.cards, vec!["c1", "c2"]);
    }

    #[test]
    fn test_collection_row() {
        let collection = Collection::new("user-1", vec!["d1".to_string()]);
        let row = with_id("user-1", collection.to_fields());

        assert_eq!(Collection::from_dynamodb(&row).unwrap(), collection);
    }

    #[test]
    fn test_missing_attribute_is_parse_error() {
        let row = with_id("u1", Item::new());
        assert!(matches!(User::from_dynamodb(&row), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_bad_due_is_parse_error() {
        let mut row = with_id("c1", Card::new("Q", "A", None).to_fields());
        row.insert(CARD_DUE.to_string(), AttributeValue::N("soon".to_string()));
        assert!(Card::from_dynamodb(&row).is_err());
    }
}
