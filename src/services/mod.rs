//! Services module
//!
//! Contains the review-facing `DataService` contract and its in-memory
//! implementation.

pub mod clock;
pub mod fake_data;

pub use clock::{Clock, ClockMode, FrozenClock, SystemClock};
pub use fake_data::{Card, Deck, FakeDataService};

use async_trait::async_trait;

use crate::error::DataError;
use crate::schemas::{Answer, CardDetail, CardDetailResponse, CollectionResponse, DeckResponse};

/// Operations the review UI performs against a user's collection.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Create an empty deck and return the updated collection.
    async fn add_deck(&self, name: &str) -> Result<CollectionResponse, DataError>;

    async fn fetch_collection(&self) -> Result<CollectionResponse, DataError>;

    async fn fetch_deck(&self, id: &str) -> Result<DeckResponse, DataError>;

    /// Details for the given card ids. Unknown ids are omitted.
    async fn fetch_cards(&self, ids: &[String]) -> Result<CardDetailResponse, DataError>;

    async fn answer_card(&self, id: &str, answer: Answer) -> Result<CardDetail, DataError>;

    async fn add_card(
        &self,
        deck_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<CardDetail, DataError>;
}
