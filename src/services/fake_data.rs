//! In-memory collection store
//!
//! Simulates a user's flashcard collection without external storage, for
//! deterministic tests and the prototype HTTP backend.
//!
//! Cards live in an arena keyed by id; each deck keeps the ordered list of
//! its card ids. All state sits behind a single `RwLock`, so every mutation
//! (including the find/remove/append done by `answer_card`) is atomic with
//! respect to other callers.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::DataError;
use crate::schemas::{
    Answer, CardDetail, CardDetailResponse, CardStatus, CardSummary, CollectionResponse,
    DeckResponse, DeckSummary, ONE_DAY_IN_SECONDS,
};
use crate::services::{Clock, DataService, FrozenClock};

// Synthetic deck layout: good cards first, then due, then new.
const GOOD_COUNT: usize = 30;
const DUE_COUNT: usize = 27;
const NEW_COUNT: usize = 23;
const SYNTHETIC_CARD_COUNT: usize = GOOD_COUNT + DUE_COUNT + NEW_COUNT;

const DEFAULT_DECK_COUNT: usize = 6;

// ============================================================================
// Entities
// ============================================================================

/// A question/answer pair with an optional due timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub due: Option<i64>,
}

impl Card {
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
            due,
        }
    }

    pub fn is_new(&self) -> bool {
        self.due.is_none()
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.due.is_some_and(|due| due < now)
    }

    pub fn status(&self, now: i64) -> CardStatus {
        CardStatus::derive(self.due, now)
    }

    fn detail(&self) -> CardDetail {
        CardDetail::new(&self.id, &self.question, &self.answer, self.due)
    }
}

/// Seed representation of a deck and the cards it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cards,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug)]
struct DeckEntry {
    id: String,
    name: String,
    card_ids: Vec<String>,
}

#[derive(Debug)]
struct Store {
    /// Decks in creation order
    decks: Vec<DeckEntry>,
    /// Deck id -> position in `decks`
    deck_index: HashMap<String, usize>,
    cards: HashMap<String, Card>,
    /// Card id -> owning deck id
    card_deck: HashMap<String, String>,
    /// Shared by decks and cards; starts at 1
    id_counter: u64,
}

impl Store {
    fn new() -> Self {
        Self {
            decks: Vec::new(),
            deck_index: HashMap::new(),
            cards: HashMap::new(),
            card_deck: HashMap::new(),
            id_counter: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.id_counter;
        self.id_counter += 1;
        id
    }

    /// Next `deck-<n>` not already taken by a seeded or numbered deck.
    fn next_deck_id(&mut self) -> String {
        loop {
            let id = format!("deck-{}", self.next_id());
            if !self.deck_index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Next `<deck>-card-<n>` not already in the arena. Synthetic cards use
    /// the same pattern, so counter values they occupy are skipped.
    fn next_card_id(&mut self, deck_id: &str) -> String {
        loop {
            let id = format!("{}-card-{}", deck_id, self.next_id());
            if !self.cards.contains_key(&id) {
                return id;
            }
        }
    }

    /// Reject a deck whose id, or any of whose card ids, is already taken.
    fn check_ids(&self, deck: &Deck) -> Result<(), DataError> {
        if self.deck_index.contains_key(&deck.id) {
            return Err(DataError::InvalidInput(format!(
                "deck with id [{}] already exists",
                deck.id
            )));
        }

        let mut seen = HashSet::new();
        for card in &deck.cards {
            if self.cards.contains_key(&card.id) || !seen.insert(card.id.as_str()) {
                return Err(DataError::InvalidInput(format!(
                    "card with id [{}] already exists",
                    card.id
                )));
            }
        }

        Ok(())
    }

    fn push_deck(&mut self, deck: Deck) -> Result<(), DataError> {
        self.check_ids(&deck)?;
        self.insert_deck(deck);
        Ok(())
    }

    /// Caller guarantees the ids are free.
    fn insert_deck(&mut self, deck: Deck) {
        let card_ids = deck.cards.iter().map(|c| c.id.clone()).collect();
        for card in deck.cards {
            self.card_deck.insert(card.id.clone(), deck.id.clone());
            self.cards.insert(card.id.clone(), card);
        }
        self.deck_index.insert(deck.id.clone(), self.decks.len());
        self.decks.push(DeckEntry {
            id: deck.id,
            name: deck.name,
            card_ids,
        });
    }

    /// Create a deck. Supplying `id_number` fills it with synthetic cards and
    /// fails if `deck-<id_number>` already exists.
    fn create_deck(
        &mut self,
        name: &str,
        id_number: Option<u64>,
        now: i64,
    ) -> Result<String, DataError> {
        let deck = match id_number {
            Some(n) => synthetic_deck(n, name, now),
            None => Deck::new(self.next_deck_id(), name, Vec::new()),
        };
        let deck_id = deck.id.clone();

        tracing::debug!(deck_id = %deck_id, name = %name, cards = deck.cards.len(), "Created deck");

        self.push_deck(deck)?;
        Ok(deck_id)
    }

    fn deck(&self, id: &str) -> Option<&DeckEntry> {
        self.deck_index.get(id).and_then(|&idx| self.decks.get(idx))
    }

    fn deck_cards<'a>(&'a self, deck: &'a DeckEntry) -> impl Iterator<Item = &'a Card> + 'a {
        deck.card_ids.iter().filter_map(|id| self.cards.get(id))
    }

    fn collection(&self, now: i64) -> CollectionResponse {
        let decks = self
            .decks
            .iter()
            .map(|deck| {
                let (mut due_count, mut new_count) = (0, 0);
                for card in self.deck_cards(deck) {
                    if card.is_due(now) {
                        due_count += 1;
                    }
                    if card.is_new() {
                        new_count += 1;
                    }
                }
                DeckSummary {
                    id: deck.id.clone(),
                    name: deck.name.clone(),
                    total_count: deck.card_ids.len(),
                    due_count,
                    new_count,
                }
            })
            .collect();

        CollectionResponse::new(decks)
    }
}

fn synthetic_deck(id_number: u64, name: &str, now: i64) -> Deck {
    let deck_id = format!("deck-{}", id_number);
    let cards = synthetic_cards(&deck_id, now);
    Deck::new(deck_id, name, cards)
}

fn synthetic_cards(deck_id: &str, now: i64) -> Vec<Card> {
    (0..SYNTHETIC_CARD_COUNT)
        .map(|i| {
            let offset = ONE_DAY_IN_SECONDS * (i as i64 + 1);
            let due = if i < GOOD_COUNT {
                Some(now + offset)
            } else if i < GOOD_COUNT + DUE_COUNT {
                Some(now - offset)
            } else {
                None
            };

            Card::new(
                format!("{}-card-{}", deck_id, i),
                format!("Question Number {}?", i),
                format!("Answer Number {}", i),
                due,
            )
        })
        .collect()
}

// ============================================================================
// FakeDataService
// ============================================================================

/// In-memory `DataService` implementation
pub struct FakeDataService {
    clock: Arc<dyn Clock>,
    store: RwLock<Store>,
}

impl FakeDataService {
    /// Create a store holding the default collection: six synthetic decks
    /// named `Deck1`..`Deck6`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.epoch_seconds();
        let mut store = Store::new();

        // fresh store, so the numbered decks cannot collide
        for _ in 0..DEFAULT_DECK_COUNT {
            let id_number = store.next_id();
            store.insert_deck(synthetic_deck(id_number, &format!("Deck{}", id_number), now));
        }

        tracing::debug!(decks = store.decks.len(), "Bootstrapped default collection");

        Self {
            clock,
            store: RwLock::new(store),
        }
    }

    /// Create a store seeded with an explicit list of decks.
    ///
    /// Fails with `InvalidInput` if a deck id or card id appears twice.
    pub fn with_decks(clock: Arc<dyn Clock>, decks: Vec<Deck>) -> Result<Self, DataError> {
        let mut store = Store::new();
        for deck in decks {
            store.push_deck(deck)?;
        }

        Ok(Self {
            clock,
            store: RwLock::new(store),
        })
    }

    /// Create a store with no decks.
    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            store: RwLock::new(Store::new()),
        }
    }

    /// Default collection under a clock frozen at epoch second 1
    pub fn frozen() -> Self {
        Self::new(Arc::new(FrozenClock::default()))
    }

    /// Create a deck and return the updated collection.
    ///
    /// When `id_number` is supplied the deck gets that number and is filled
    /// with 80 synthetic cards (30 scheduled, 27 overdue, 23 new). Otherwise
    /// the next free id is allocated and the deck starts empty. An
    /// `id_number` whose deck already exists fails with `InvalidInput`.
    pub async fn create_deck(
        &self,
        name: &str,
        id_number: Option<u64>,
    ) -> Result<CollectionResponse, DataError> {
        let now = self.clock.epoch_seconds();
        let mut store = self.store.write().await;
        store.create_deck(name, id_number, now)?;
        Ok(store.collection(now))
    }
}

#[async_trait]
impl DataService for FakeDataService {
    async fn add_deck(&self, name: &str) -> Result<CollectionResponse, DataError> {
        self.create_deck(name, None).await
    }

    async fn fetch_collection(&self) -> Result<CollectionResponse, DataError> {
        let now = self.clock.epoch_seconds();
        let store = self.store.read().await;
        Ok(store.collection(now))
    }

    async fn fetch_deck(&self, id: &str) -> Result<DeckResponse, DataError> {
        let now = self.clock.epoch_seconds();
        let store = self.store.read().await;

        let deck = store
            .deck(id)
            .ok_or_else(|| DataError::DeckNotFound(id.to_string()))?;

        let cards = store
            .deck_cards(deck)
            .map(|card| CardSummary {
                id: card.id.clone(),
                status: card.status(now),
            })
            .collect();

        Ok(DeckResponse {
            id: deck.id.clone(),
            name: deck.name.clone(),
            cards,
        })
    }

    async fn fetch_cards(&self, ids: &[String]) -> Result<CardDetailResponse, DataError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let guard = self.store.read().await;
        let store: &Store = &guard;

        let cards = store
            .decks
            .iter()
            .flat_map(|deck| store.deck_cards(deck))
            .filter(|card| wanted.contains(card.id.as_str()))
            .map(Card::detail)
            .collect();

        Ok(CardDetailResponse { cards })
    }

    async fn answer_card(&self, id: &str, answer: Answer) -> Result<CardDetail, DataError> {
        let now = self.clock.epoch_seconds();
        let mut store = self.store.write().await;

        let deck_id = store
            .card_deck
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::CardNotFound(id.to_string()))?;
        let deck_idx = *store
            .deck_index
            .get(&deck_id)
            .ok_or_else(|| DataError::DeckNotFound(deck_id.clone()))?;

        let card = store
            .cards
            .get_mut(id)
            .ok_or_else(|| DataError::CardNotFound(id.to_string()))?;
        card.due = Some(now + ONE_DAY_IN_SECONDS);
        let detail = card.detail();

        let card_ids = &mut store.decks[deck_idx].card_ids;
        if let Some(pos) = card_ids.iter().position(|c| c == id) {
            let moved = card_ids.remove(pos);
            card_ids.push(moved);
        }

        tracing::debug!(card_id = %id, answer = %answer, due = ?detail.due, "Answered card");

        Ok(detail)
    }

    async fn add_card(
        &self,
        deck_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<CardDetail, DataError> {
        let mut store = self.store.write().await;

        let deck_idx = *store
            .deck_index
            .get(deck_id)
            .ok_or_else(|| DataError::DeckNotFound(deck_id.to_string()))?;

        let card_id = store.next_card_id(deck_id);
        let card = Card::new(card_id.clone(), question, answer, None);
        let detail = card.detail();

        store.decks[deck_idx].card_ids.push(card_id.clone());
        store.card_deck.insert(card_id.clone(), deck_id.to_string());
        store.cards.insert(card_id, card);

        Ok(detail)
    }
}
