//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{flashcards, health};
use crate::middleware::{log_request, REQUEST_ID_HEADER, TRACE_ID_HEADER};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    let api_routes = Router::new()
        .route("/collection", get(flashcards::fetch_collection))
        .route("/decks", post(flashcards::add_deck))
        .route("/decks/:id", get(flashcards::fetch_deck))
        .route("/decks/:id/cards", post(flashcards::add_card))
        .route("/cards", get(flashcards::fetch_cards))
        .route("/cards/:id/answer", post(flashcards::answer_card));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // last added = outermost = runs first
        .layer(create_cors_layer())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Create CORS layer with permissive settings for development
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(TRACE_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::{create_dynamodb_client, Settings};
    use crate::db::DynamoDbDao;

    async fn router() -> Router {
        let settings = Settings::default();
        let client = create_dynamodb_client(&settings).await;
        let dao = DynamoDbDao::new(client, settings.throughput);

        create_router(AppState::with_dao(settings, Arc::new(dao)))
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read_json(response).await
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        read_json(response).await
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_collection_lists_default_decks() {
        let router = router().await;

        let (status, body) = get_json(&router, "/api/collection").await;

        assert_eq!(status, StatusCode::OK);
        let decks = body["decks"].as_array().unwrap();
        assert_eq!(decks.len(), 6);
        assert_eq!(decks[1]["id"], "deck-2");
        assert_eq!(decks[1]["totalCount"], 80);
        assert_eq!(decks[1]["dueCount"], 27);
        assert_eq!(decks[1]["newCount"], 23);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_fetch_deck() {
        let router = router().await;

        let (status, body) = get_json(&router, "/api/decks/deck-2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Deck2");
        let cards = body["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 80);
        assert_eq!(cards[0]["status"], "OK");
        assert_eq!(cards[30]["status"], "DUE");
        assert_eq!(cards[79]["status"], "NEW");
    }

    #[tokio::test]
    async fn test_unknown_deck_is_404() {
        let router = router().await;

        let (status, body) = get_json(&router, "/api/decks/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"]["type"], "not_found_error");
        assert!(body["error"]["message"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_add_deck_and_card() {
        let router = router().await;

        let (status, body) = post_json(&router, "/api/decks", json!({"name": "Spanish"})).await;
        assert_eq!(status, StatusCode::CREATED);
        let decks = body["decks"].as_array().unwrap();
        assert_eq!(decks.len(), 7);
        assert_eq!(decks[6]["name"], "Spanish");
        assert_eq!(decks[6]["totalCount"], 0);

        let (status, card) = post_json(
            &router,
            "/api/decks/deck-1/cards",
            json!({"question": "Hola?", "answer": "Hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(card["id"].as_str().unwrap().starts_with("deck-1-card-"));
        assert_eq!(card["due"], Value::Null);
        assert_eq!(card["failInterval"], 43_200);
        assert_eq!(card["easyInterval"], 345_600);
    }

    #[tokio::test]
    async fn test_blank_deck_name_is_400() {
        let router = router().await;

        let (status, body) = post_json(&router, "/api/decks", json!({"name": "  "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_add_card_to_unknown_deck_is_404() {
        let router = router().await;

        let (status, _) = post_json(
            &router,
            "/api/decks/deck-99/cards",
            json!({"question": "Q", "answer": "A"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_answer_card_moves_it_last() {
        let router = router().await;

        let (status, card) = post_json(
            &router,
            "/api/cards/deck-2-card-1/answer",
            json!({"answer": "GOOD"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["due"], 1 + 86_400);

        let (_, deck) = get_json(&router, "/api/decks/deck-2").await;
        let cards = deck["cards"].as_array().unwrap();
        assert_eq!(cards[79]["id"], "deck-2-card-1");
        assert_eq!(cards[79]["status"], "OK");
    }

    #[tokio::test]
    async fn test_answer_unknown_card_is_404() {
        let router = router().await;

        let (status, body) =
            post_json(&router, "/api/cards/missing/answer", json!({"answer": "FAIL"})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_fetch_cards_by_ids() {
        let router = router().await;

        let (status, body) =
            get_json(&router, "/api/cards?ids=deck-3-card-2,unknown,deck-1-card-1").await;

        assert_eq!(status, StatusCode::OK);
        let cards = body["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 2);
        // collection order, not request order
        assert_eq!(cards[0]["id"], "deck-1-card-1");
        assert_eq!(cards[1]["id"], "deck-3-card-2");
        assert_eq!(cards[1]["question"], "Question Number 2?");

        let (status, body) = get_json(&router, "/api/cards").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["cards"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trace_id_is_echoed() {
        let router = router().await;

        let response = router
            .oneshot(
                Request::get("/liveness")
                    .header(TRACE_ID_HEADER, "trace-abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[TRACE_ID_HEADER], "trace-abc");
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-abc");
    }

    #[tokio::test]
    async fn test_health() {
        let router = router().await;

        let (status, body) = get_json(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "development");
    }
}
