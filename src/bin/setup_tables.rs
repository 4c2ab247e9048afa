//! CLI tool to create the flashcard DynamoDB tables
//!
//! Usage:
//!   cargo run --bin setup_tables
//!
//! For local development with DynamoDB Local:
//!   DYNAMODB_ENDPOINT_URL=http://localhost:8000 cargo run --bin setup_tables

use anyhow::{Context, Result};
use clap::Parser;
use flashcard_store::{
    config::{create_dynamodb_client, Settings},
    db::{DynamoDbDao, DynamoDbDataService, TableNames},
    logging::{init_tracing, LogFormat},
};

/// Create (or drop) the User, Card, Deck and Collection tables
#[derive(Parser, Debug)]
#[command(name = "setup_tables")]
#[command(about = "Create the flashcard DynamoDB tables")]
struct Args {
    /// DynamoDB endpoint URL (overrides DYNAMODB_ENDPOINT_URL)
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Table name prefix (overrides DYNAMODB_TABLE_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Drop the tables instead of creating them
    #[arg(long)]
    drop: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load()?;
    if let Some(url) = args.endpoint_url {
        settings.dynamodb_endpoint_url = Some(url);
    }
    if let Some(prefix) = args.prefix {
        settings.dynamodb_table_prefix = prefix;
    }

    init_tracing(&settings.log_level, LogFormat::Pretty)?;

    if let Some(ref url) = settings.dynamodb_endpoint_url {
        println!("Using DynamoDB endpoint: {}", url);
    }

    let client = create_dynamodb_client(&settings).await;
    let service = DynamoDbDataService::new(
        DynamoDbDao::new(client, settings.throughput),
        TableNames::from_settings(&settings),
    );

    if args.drop {
        service.drop_all().await.context("Failed to drop tables")?;
        for table in service.tables().all() {
            println!("Dropped table: {}", table);
        }
        return Ok(());
    }

    println!("\nSetting up DynamoDB tables...\n");

    let created = service
        .init_missing()
        .await
        .context("Failed to create tables")?;

    for table in service.tables().all() {
        if created.iter().any(|name| name == table) {
            println!("Created table: {}", table);
        } else {
            println!("Table already exists: {}", table);
        }
    }

    println!("\nTable setup complete!\n");

    Ok(())
}
