//! Flashcard collection endpoints
//!
//! Thin JSON handlers over the shared `DataService`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::schemas::{
    AddCardRequest, AddDeckRequest, AnswerCardRequest, CardDetail, CardDetailResponse,
    CollectionResponse, DeckResponse,
};
use crate::server::state::AppState;

/// Query string for `GET /api/cards`
#[derive(Debug, Deserialize)]
pub struct CardsQuery {
    /// Comma-separated card ids
    pub ids: Option<String>,
}

impl CardsQuery {
    fn ids(&self) -> Vec<String> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// GET /api/collection
pub async fn fetch_collection(
    State(state): State<AppState>,
) -> Result<Json<CollectionResponse>, ApiError> {
    Ok(Json(state.data.fetch_collection().await?))
}

/// POST /api/decks
pub async fn add_deck(
    State(state): State<AppState>,
    Json(request): Json<AddDeckRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), ApiError> {
    let name = require_text("name", &request.name)?;

    let collection = state.data.add_deck(name).await?;
    tracing::info!(name = %name, decks = collection.decks.len(), "Added deck");

    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET /api/decks/:id
pub async fn fetch_deck(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeckResponse>, ApiError> {
    Ok(Json(state.data.fetch_deck(&id).await?))
}

/// POST /api/decks/:id/cards
pub async fn add_card(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    Json(request): Json<AddCardRequest>,
) -> Result<(StatusCode, Json<CardDetail>), ApiError> {
    let question = require_text("question", &request.question)?;
    let answer = require_text("answer", &request.answer)?;

    let card = state.data.add_card(&deck_id, question, answer).await?;
    tracing::info!(deck_id = %deck_id, card_id = %card.id, "Added card");

    Ok((StatusCode::CREATED, Json(card)))
}

/// GET /api/cards?ids=a,b
pub async fn fetch_cards(
    State(state): State<AppState>,
    Query(query): Query<CardsQuery>,
) -> Result<Json<CardDetailResponse>, ApiError> {
    let ids = query.ids();
    Ok(Json(state.data.fetch_cards(&ids).await?))
}

/// POST /api/cards/:id/answer
pub async fn answer_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnswerCardRequest>,
) -> Result<Json<CardDetail>, ApiError> {
    Ok(Json(state.data.answer_card(&id, request.answer).await?))
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
