//! Flashcard API shapes
//!
//! Response types consumed by the review UI. Field names are camelCase on
//! the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Scheduling intervals
// ============================================================================

// Fixed placeholders; no adaptive scheduling is computed from answers.
pub const HALF_DAY_IN_SECONDS: i64 = 43_200;
pub const ONE_DAY_IN_SECONDS: i64 = HALF_DAY_IN_SECONDS * 2;
pub const TWO_DAYS_IN_SECONDS: i64 = ONE_DAY_IN_SECONDS * 2;
pub const FOUR_DAYS_IN_SECONDS: i64 = TWO_DAYS_IN_SECONDS * 2;

/// How well the user recalled a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Answer {
    Fail,
    Hard,
    Good,
    Easy,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Fail => write!(f, "FAIL"),
            Answer::Hard => write!(f, "HARD"),
            Answer::Good => write!(f, "GOOD"),
            Answer::Easy => write!(f, "EASY"),
        }
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FAIL" => Ok(Answer::Fail),
            "HARD" => Ok(Answer::Hard),
            "GOOD" => Ok(Answer::Good),
            "EASY" => Ok(Answer::Easy),
            _ => Err(format!(
                "Invalid answer: {}. Expected: FAIL, HARD, GOOD, or EASY",
                s
            )),
        }
    }
}

/// Review state of a card relative to the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    /// Never reviewed
    New,
    /// Past its due time
    Due,
    /// Scheduled in the future
    Ok,
}

impl CardStatus {
    /// Derive the status from an optional due timestamp and the current time.
    pub fn derive(due: Option<i64>, now: i64) -> Self {
        match due {
            None => CardStatus::New,
            Some(due) if now > due => CardStatus::Due,
            Some(_) => CardStatus::Ok,
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Per-deck counts shown on the collection screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub id: String,
    pub name: String,
    pub total_count: usize,
    pub due_count: usize,
    pub new_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub decks: Vec<DeckSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionResponse {
    pub fn new(decks: Vec<DeckSummary>) -> Self {
        Self { decks, error: None }
    }
}

// ============================================================================
// Deck
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: String,
    pub status: CardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckResponse {
    pub id: String,
    pub name: String,
    pub cards: Vec<CardSummary>,
}

// ============================================================================
// Cards
// ============================================================================

/// Full card content plus the interval offered for each answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetail {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub fail_interval: i64,
    pub hard_interval: i64,
    pub good_interval: i64,
    pub easy_interval: i64,
    pub due: Option<i64>,
}

impl CardDetail {
    /// Build a detail carrying the fixed interval constants.
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        due: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
            fail_interval: HALF_DAY_IN_SECONDS,
            hard_interval: ONE_DAY_IN_SECONDS,
            good_interval: TWO_DAYS_IN_SECONDS,
            easy_interval: FOUR_DAYS_IN_SECONDS,
            due,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardDetailResponse {
    pub cards: Vec<CardDetail>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddDeckRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCardRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerCardRequest {
    pub answer: Answer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_constants() {
        assert_eq!(HALF_DAY_IN_SECONDS, 43_200);
        assert_eq!(ONE_DAY_IN_SECONDS, 86_400);
        assert_eq!(TWO_DAYS_IN_SECONDS, 172_800);
        assert_eq!(FOUR_DAYS_IN_SECONDS, 345_600);
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(CardStatus::derive(None, 100), CardStatus::New);
        assert_eq!(CardStatus::derive(Some(99), 100), CardStatus::Due);
        // equal is not yet due
        assert_eq!(CardStatus::derive(Some(100), 100), CardStatus::Ok);
        assert_eq!(CardStatus::derive(Some(200), 100), CardStatus::Ok);
    }

    #[test]
    fn test_card_detail_serializes_camel_case() {
        let detail = CardDetail::new("c1", "Q?", "A", None);
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["failInterval"], 43_200);
        assert_eq!(json["easyInterval"], 345_600);
        assert!(json["due"].is_null());
    }

    #[test]
    fn test_collection_response_omits_missing_error() {
        let json = serde_json::to_string(&CollectionResponse::new(vec![])).unwrap();
        assert_eq!(json, r#"{"decks":[]}"#);
    }

    #[test]
    fn test_answer_parsing() {
        assert_eq!("good".parse::<Answer>().unwrap(), Answer::Good);
        assert_eq!(
            serde_json::from_str::<Answer>(r#""EASY""#).unwrap(),
            Answer::Easy
        );
        assert!("maybe".parse::<Answer>().is_err());
    }
}
