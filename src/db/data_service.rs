//! DynamoDB-backed entity storage
//!
//! Maps `User`, `Card`, `Deck` and `Collection` entities onto their
//! flattened rows through `DynamoDbDao`.

use rand::Rng;
use uuid::Uuid;

use crate::config::Settings;
use crate::db::dynamodb::{id_key, DynamoDbDao, IndexDefinition, IndexType, Item};
use crate::db::models::{
    Card, Collection, Deck, User, CARD_TABLE, COLLECTION_TABLE, DECK_TABLE, USER_EMAIL,
    USER_TABLE,
};
use crate::error::DataError;

/// Physical table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub user: String,
    pub card: String,
    pub deck: String,
    pub collection: String,
}

impl TableNames {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            user: settings.table_name(USER_TABLE),
            card: settings.table_name(CARD_TABLE),
            deck: settings.table_name(DECK_TABLE),
            collection: settings.table_name(COLLECTION_TABLE),
        }
    }

    pub fn all(&self) -> [&str; 4] {
        [&self.user, &self.card, &self.deck, &self.collection]
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            user: USER_TABLE.to_string(),
            card: CARD_TABLE.to_string(),
            deck: DECK_TABLE.to_string(),
            collection: COLLECTION_TABLE.to_string(),
        }
    }
}

/// Entity storage over DynamoDB
#[derive(Clone)]
pub struct DynamoDbDataService {
    dao: DynamoDbDao,
    tables: TableNames,
    /// Node id for v1 UUIDs, fixed for the lifetime of the service
    node_id: [u8; 6],
}

impl DynamoDbDataService {
    pub fn new(dao: DynamoDbDao, tables: TableNames) -> Self {
        Self {
            dao,
            tables,
            node_id: rand::thread_rng().gen(),
        }
    }

    pub fn dao(&self) -> &DynamoDbDao {
        &self.dao
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn generate_id(&self) -> String {
        Uuid::now_v1(&self.node_id).to_string()
    }

    /// Create the four entity tables.
    pub async fn init(&self) -> Result<(), DataError> {
        for (table, indexes) in self.table_definitions() {
            self.dao.create_table(table, &indexes).await?;
        }
        Ok(())
    }

    /// Create whichever entity tables do not exist yet, returning their names.
    pub async fn init_missing(&self) -> Result<Vec<String>, DataError> {
        let existing = self.dao.list_tables().await?;
        let mut created = Vec::new();

        for (table, indexes) in self.table_definitions() {
            if existing.iter().any(|name| name == table) {
                tracing::debug!(table = %table, "Table already exists");
                continue;
            }
            self.dao.create_table(table, &indexes).await?;
            created.push(table.to_string());
        }

        Ok(created)
    }

    fn table_definitions(&self) -> [(&str, Vec<IndexDefinition>); 4] {
        // The email index is non-unique; it does not prevent duplicate users.
        [
            (
                self.tables.user.as_str(),
                vec![IndexDefinition::new(USER_EMAIL, IndexType::String)],
            ),
            (self.tables.card.as_str(), Vec::new()),
            (self.tables.deck.as_str(), Vec::new()),
            (self.tables.collection.as_str(), Vec::new()),
        ]
    }

    /// Drop the four entity tables.
    pub async fn drop_all(&self) -> Result<(), DataError> {
        for table in self.tables.all() {
            self.dao.drop_table(table).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // User
    // ------------------------------------------------------------------

    pub async fn save_user(&self, user: &User) -> Result<User, DataError> {
        let id = self.generate_id();
        self.dao
            .insert(&self.tables.user, id_key(&id), user.to_fields())
            .await?;

        Ok(User {
            id: Some(id),
            ..user.clone()
        })
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, DataError> {
        self.find(&self.tables.user, id, User::from_dynamodb).await
    }

    pub async fn update_user(&self, user: &User) -> Result<User, DataError> {
        let id = require_id(&user.id, "User")?;
        let row = self
            .dao
            .update(&self.tables.user, id_key(id), &[user.to_updates()])
            .await?;
        User::from_dynamodb(&row)
    }

    pub async fn delete_user(&self, id: &str) -> Result<Option<User>, DataError> {
        self.delete(&self.tables.user, id, User::from_dynamodb).await
    }

    // ------------------------------------------------------------------
    // Card
    // ------------------------------------------------------------------

    pub async fn save_card(&self, card: &Card) -> Result<Card, DataError> {
        let id = self.generate_id();
        self.dao
            .insert(&self.tables.card, id_key(&id), card.to_fields())
            .await?;

        Ok(Card {
            id: Some(id),
            ..card.clone()
        })
    }

    pub async fn find_card(&self, id: &str) -> Result<Option<Card>, DataError> {
        self.find(&self.tables.card, id, Card::from_dynamodb).await
    }

    pub async fn update_card(&self, card: &Card) -> Result<Card, DataError> {
        let id = require_id(&card.id, "Card")?;
        let row = self
            .dao
            .update(&self.tables.card, id_key(id), &[card.to_updates()])
            .await?;
        Card::from_dynamodb(&row)
    }

    pub async fn delete_card(&self, id: &str) -> Result<Option<Card>, DataError> {
        self.delete(&self.tables.card, id, Card::from_dynamodb).await
    }

    // ------------------------------------------------------------------
    // Deck
    // ------------------------------------------------------------------

    pub async fn save_deck(&self, deck: &Deck) -> Result<Deck, DataError> {
        let id = self.generate_id();
        self.dao
            .insert(&self.tables.deck, id_key(&id), deck.to_fields())
            .await?;

        Ok(Deck {
            id: Some(id),
            ..deck.clone()
        })
    }

    pub async fn find_deck(&self, id: &str) -> Result<Option<Deck>, DataError> {
        self.find(&self.tables.deck, id, Deck::from_dynamodb).await
    }

    pub async fn update_deck(&self, deck: &Deck) -> Result<Deck, DataError> {
        let id = require_id(&deck.id, "Deck")?;
        let row = self
            .dao
            .update(&self.tables.deck, id_key(id), &[deck.to_updates()])
            .await?;
        Deck::from_dynamodb(&row)
    }

    pub async fn delete_deck(&self, id: &str) -> Result<Option<Deck>, DataError> {
        self.delete(&self.tables.deck, id, Deck::from_dynamodb).await
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Persist a collection under its owning user's id.
    ///
    /// Fails with `MissingId` before any request is made when the id is absent.
    pub async fn save_collection(&self, collection: &Collection) -> Result<Collection, DataError> {
        let id = require_id(&collection.id, "Collection")?;
        self.dao
            .insert(&self.tables.collection, id_key(id), collection.to_fields())
            .await?;

        Ok(collection.clone())
    }

    pub async fn find_collection(&self, id: &str) -> Result<Option<Collection>, DataError> {
        self.find(&self.tables.collection, id, Collection::from_dynamodb)
            .await
    }

    pub async fn update_collection(
        &self,
        collection: &Collection,
    ) -> Result<Collection, DataError> {
        let id = require_id(&collection.id, "Collection")?;
        let row = self
            .dao
            .update(&self.tables.collection, id_key(id), &[collection.to_updates()])
            .await?;
        Collection::from_dynamodb(&row)
    }

    pub async fn delete_collection(&self, id: &str) -> Result<Option<Collection>, DataError> {
        self.delete(&self.tables.collection, id, Collection::from_dynamodb)
            .await
    }

    // ------------------------------------------------------------------

    async fn find<T>(
        &self,
        table: &str,
        id: &str,
        parse: fn(&Item) -> Result<T, DataError>,
    ) -> Result<Option<T>, DataError> {
        self.dao
            .find_one(table, id_key(id))
            .await?
            .as_ref()
            .map(parse)
            .transpose()
    }

    async fn delete<T>(
        &self,
        table: &str,
        id: &str,
        parse: fn(&Item) -> Result<T, DataError>,
    ) -> Result<Option<T>, DataError> {
        self.dao
            .delete(table, id_key(id))
            .await?
            .as_ref()
            .map(parse)
            .transpose()
    }
}

fn require_id<'a>(id: &'a Option<String>, entity: &'static str) -> Result<&'a str, DataError> {
    id.as_deref().ok_or(DataError::MissingId { entity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::create_dynamodb_client;

    async fn service(settings: &Settings) -> DynamoDbDataService {
        let client = create_dynamodb_client(settings).await;
        DynamoDbDataService::new(
            DynamoDbDao::new(client, settings.throughput),
            TableNames::from_settings(settings),
        )
    }

    #[test]
    fn test_table_names_with_prefix() {
        let mut settings = Settings::default();
        settings.dynamodb_table_prefix = "test-".to_string();

        let tables = TableNames::from_settings(&settings);
        assert_eq!(tables.all(), ["test-User", "test-Card", "test-Deck", "test-Collection"]);
        assert_eq!(TableNames::default().user, "User");
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(&Some("u1".to_string()), "Collection").unwrap(), "u1");
        assert_eq!(
            require_id(&None, "Collection").unwrap_err(),
            DataError::MissingId { entity: "Collection" }
        );
    }

    #[tokio::test]
    async fn test_save_collection_without_id_fails_before_io() {
        // Unroutable endpoint: any request would fail with a DynamoDB error.
        let mut settings = Settings::default();
        settings.dynamodb_endpoint_url = Some("http://127.0.0.1:1".to_string());
        let service = service(&settings).await;

        let collection = Collection {
            id: None,
            decks: vec![],
        };
        let err = service.save_collection(&collection).await.unwrap_err();
        assert_eq!(err, DataError::MissingId { entity: "Collection" });

        let err = service.update_card(&Card::new("Q", "A", None)).await.unwrap_err();
        assert_eq!(err, DataError::MissingId { entity: "Card" });
    }

    #[tokio::test]
    async fn test_only_user_table_is_indexed() {
        let service = service(&Settings::default()).await;

        let definitions = service.table_definitions();
        assert_eq!(definitions[0].0, "User");
        assert_eq!(definitions[0].1, vec![IndexDefinition::new("email", IndexType::String)]);
        assert!(definitions[1..].iter().all(|(_, indexes)| indexes.is_empty()));
    }

    #[tokio::test]
    async fn test_generated_ids_are_v1_and_unique() {
        let service = service(&Settings::default()).await;

        let a = Uuid::parse_str(&service.generate_id()).unwrap();
        let b = Uuid::parse_str(&service.generate_id()).unwrap();
        assert_eq!(a.get_version_num(), 1);
        assert_ne!(a, b);
    }

    /// Needs DynamoDB Local: `DYNAMODB_ENDPOINT_URL=http://localhost:8000 cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_card_round_trip_against_live_endpoint() {
        let mut settings = Settings::load().unwrap();
        settings.dynamodb_table_prefix = format!("it-{}-", Uuid::new_v4().simple());
        let service = service(&settings).await;
        service.init().await.unwrap();

        let cards = [
            Card::new("Question 1?", "Answer 1?", None),
            Card::new("Question 2?", "Answer 2?", Some(20999)),
        ];
        for card in &cards {
            let saved = service.save_card(card).await.unwrap();
            let id = saved.id.clone().unwrap();

            let found = service.find_card(&id).await.unwrap().unwrap();
            assert_eq!(found.question, card.question);
            assert_eq!(found.answer, card.answer);
            assert_eq!(found.due, card.due);
        }

        let user = service.save_user(&User::new("blah@somewhere.com")).await.unwrap();
        let user_id = user.id.clone().unwrap();
        let found = service.find_user(&user_id).await.unwrap().unwrap();
        assert_eq!(found.email, "blah@somewhere.com");

        let deck = service
            .save_deck(&Deck::new("Deck", vec!["c1".to_string()]))
            .await
            .unwrap();
        let collection = Collection::new(&user_id, vec![deck.id.clone().unwrap()]);
        service.save_collection(&collection).await.unwrap();
        assert_eq!(
            service.find_collection(&user_id).await.unwrap(),
            Some(collection)
        );

        let mut renamed = deck.clone();
        renamed.name = "Renamed".to_string();
        assert_eq!(service.update_deck(&renamed).await.unwrap().name, "Renamed");

        assert!(service.delete_deck(deck.id.as_deref().unwrap()).await.unwrap().is_some());
        assert_eq!(service.find_deck(deck.id.as_deref().unwrap()).await.unwrap(), None);

        service.drop_all().await.unwrap();
    }
}
