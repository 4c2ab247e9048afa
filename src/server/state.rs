//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{create_dynamodb_client, Settings};
use crate::db::DynamoDbDao;
use crate::services::{DataService, FakeDataService};

/// Shared application state
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Collection store behind the review API
    pub data: Arc<dyn DataService>,

    /// DynamoDB access, used for readiness checks
    pub dynamodb: Arc<DynamoDbDao>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    ///
    /// The DynamoDB SDK client is initialized asynchronously.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        tracing::debug!(
            region = %settings.aws_region,
            dynamodb_endpoint = ?settings.dynamodb_endpoint_url,
            "Creating DynamoDB client"
        );
        let client = create_dynamodb_client(&settings).await;
        let dynamodb = Arc::new(DynamoDbDao::new(client, settings.throughput));

        let state = Self::with_dao(settings, dynamodb);

        tracing::info!("Application state initialized successfully");

        Ok(state)
    }

    /// Build state around an existing DAO, creating the in-memory store
    /// from the clock and seeding settings.
    pub fn with_dao(settings: Settings, dynamodb: Arc<DynamoDbDao>) -> Self {
        let clock = settings.clock_mode.build(settings.frozen_clock_seconds);
        tracing::debug!(
            clock_mode = %settings.clock_mode,
            now = clock.epoch_seconds(),
            seed_default_decks = settings.seed_default_decks,
            "Initializing collection store"
        );

        let data: Arc<dyn DataService> = if settings.seed_default_decks {
            Arc::new(FakeDataService::new(clock))
        } else {
            Arc::new(FakeDataService::empty(clock))
        };

        Self {
            settings: Arc::new(settings),
            data,
            dynamodb,
            start_time: Instant::now(),
        }
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
