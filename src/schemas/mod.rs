//! API schemas module
//!
//! Wire types exchanged with the review UI.

pub mod flashcards;

pub use flashcards::{
    AddCardRequest, AddDeckRequest, Answer, AnswerCardRequest, CardDetail, CardDetailResponse,
    CardStatus, CardSummary, CollectionResponse, DeckResponse, DeckSummary, FOUR_DAYS_IN_SECONDS,
    HALF_DAY_IN_SECONDS, ONE_DAY_IN_SECONDS, TWO_DAYS_IN_SECONDS,
};
