//! MongoDB store backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc, oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime},
    options::{
        ClientOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions,
        ReturnDocument,
    },
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use placemark_core::error::{PlacemarkError, PlacemarkResult};
use placemark_core::traits::{RecordStore, VersionStore};
use placemark_core::types::{Listing, ListingRecord, ListingVersion, RecordMeta};

const RECORDS_COLLECTION: &str = "listings";
const VERSIONS_COLLECTION: &str = "listingVersions";

/// MongoDB connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub uri: String,
    /// Database name.
    pub database: String,
}

impl MongoConfig {
    /// Read settings from `MONGO_URI` and `MONGODB_NAME`, loading a `.env`
    /// file first when one is present.
    pub fn from_env() -> PlacemarkResult<Self> {
        dotenvy::dotenv().ok();
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| PlacemarkError::Configuration("MONGO_URI is not set".to_string()))?;
        let database =
            std::env::var("MONGODB_NAME").unwrap_or_else(|_| "placemark".to_string());
        Ok(Self { uri, database })
    }
}

/// Create a MongoDB client for the given configuration.
pub async fn connect_client(config: &MongoConfig) -> PlacemarkResult<Client> {
    let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
        PlacemarkError::store_connection(format!("Failed to parse MongoDB URI: {}", e))
    })?;
    options.app_name = Some("placemark".to_string());

    let client = Client::with_options(options).map_err(|e| {
        PlacemarkError::store_connection(format!("Failed to create MongoDB client: {}", e))
    })?;
    tracing::info!(database = %config.database, "created MongoDB client");
    Ok(client)
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaDocument {
    // Stored as a BSON Int32, matching the original document layout; bson
    // serializes `u32` as Int64, so the wire type is pinned to `i32` here.
    #[serde(rename = "currentVersion")]
    current_version: i32,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(flatten)]
    listing: Listing,
    url_hash: String,
    meta: MetaDocument,
}

impl RecordDocument {
    fn into_record(self) -> ListingRecord {
        ListingRecord {
            id: self.id.to_hex(),
            listing: self.listing,
            url_hash: self.url_hash,
            meta: RecordMeta {
                current_version: self.meta.current_version as u32,
                created_at: self.meta.created_at,
                updated_at: self.meta.updated_at,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "listingId")]
    listing_id: ObjectId,
    version: u32,
    #[serde(flatten)]
    listing: Listing,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl VersionDocument {
    fn into_version(self) -> ListingVersion {
        ListingVersion {
            listing_id: self.listing_id.to_hex(),
            version: self.version,
            listing: self.listing,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn store_err(context: &str, e: mongodb::error::Error) -> PlacemarkError {
    PlacemarkError::store_with_source(format!("{}: {}", context, e), e)
}

fn insert_error(e: mongodb::error::Error, url_hash: &str) -> PlacemarkError {
    use mongodb::error::{ErrorKind, WriteFailure};
    if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *e.kind {
        // 11000: duplicate key on the unique url_hash index.
        if write_error.code == 11000 {
            return PlacemarkError::duplicate_identity(url_hash);
        }
    }
    store_err("Failed to insert listing", e)
}

/// Live listing records in the `listings` collection.
pub struct MongoRecordStore {
    collection: Collection<RecordDocument>,
}

impl MongoRecordStore {
    /// Connect with the given configuration.
    pub async fn connect(config: &MongoConfig) -> PlacemarkResult<Self> {
        let client = connect_client(config).await?;
        Self::new(&client, &config.database).await
    }

    /// Create a store over an existing client.
    pub async fn new(client: &Client, database: &str) -> PlacemarkResult<Self> {
        let collection = client.database(database).collection(RECORDS_COLLECTION);
        let store = Self { collection };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// The unique index on `url_hash` backs the at-most-one-live-record-
    /// per-identity invariant; a concurrent create race surfaces as a
    /// duplicate-key error instead of a second live record.
    async fn ensure_indexes(&self) -> PlacemarkResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "url_hash": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index, None)
            .await
            .map_err(|e| store_err("Failed to create url_hash index", e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn insert(&self, listing: &Listing, url_hash: &str) -> PlacemarkResult<ListingRecord> {
        let now = Utc::now();
        let document = RecordDocument {
            id: ObjectId::new(),
            listing: listing.clone(),
            url_hash: url_hash.to_string(),
            meta: MetaDocument {
                current_version: 1,
                created_at: now,
                updated_at: now,
            },
        };

        self.collection
            .insert_one(&document, None)
            .await
            .map_err(|e| insert_error(e, url_hash))?;
        Ok(document.into_record())
    }

    async fn find_by_id(&self, id: &str) -> PlacemarkResult<Option<ListingRecord>> {
        let object_id = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let found = self
            .collection
            .find_one(doc! { "_id": object_id }, None)
            .await
            .map_err(|e| store_err("Failed to find listing by id", e))?;
        Ok(found.map(RecordDocument::into_record))
    }

    async fn find_by_hash(&self, url_hash: &str) -> PlacemarkResult<Option<ListingRecord>> {
        let found = self
            .collection
            .find_one(doc! { "url_hash": url_hash }, None)
            .await
            .map_err(|e| store_err("Failed to find listing by identity hash", e))?;
        Ok(found.map(RecordDocument::into_record))
    }

    async fn update_if_version(
        &self,
        id: &str,
        expected_version: u32,
        listing: &Listing,
    ) -> PlacemarkResult<Option<ListingRecord>> {
        let object_id = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        // Payload fields replace in place; the version counter and
        // timestamp advance in the same atomic write, guarded on the
        // version the caller read.
        let mut set = bson::to_document(listing)
            .map_err(|e| PlacemarkError::store(format!("Failed to serialize listing: {}", e)))?;
        set.insert("meta.currentVersion", i64::from(expected_version) + 1);
        set.insert("meta.updatedAt", bson::DateTime::from_chrono(Utc::now()));

        let filter = doc! {
            "_id": object_id,
            "meta.currentVersion": i64::from(expected_version),
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, doc! { "$set": set }, options)
            .await
            .map_err(|e| store_err("Failed to update listing", e))?;
        Ok(updated.map(RecordDocument::into_record))
    }
}

/// Archived listing snapshots in the `listingVersions` collection.
pub struct MongoVersionStore {
    collection: Collection<VersionDocument>,
}

impl MongoVersionStore {
    /// Connect with the given configuration.
    pub async fn connect(config: &MongoConfig) -> PlacemarkResult<Self> {
        let client = connect_client(config).await?;
        Self::new(&client, &config.database).await
    }

    /// Create a store over an existing client.
    pub async fn new(client: &Client, database: &str) -> PlacemarkResult<Self> {
        let collection = client.database(database).collection(VERSIONS_COLLECTION);
        let store = Self { collection };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Unique compound index: one snapshot per (listing, version), read in
    /// descending version order.
    async fn ensure_indexes(&self) -> PlacemarkResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "listingId": 1, "version": -1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index, None)
            .await
            .map_err(|e| store_err("Failed to create version index", e))?;
        Ok(())
    }
}

#[async_trait]
impl VersionStore for MongoVersionStore {
    async fn append(&self, version: &ListingVersion) -> PlacemarkResult<()> {
        let listing_id = ObjectId::parse_str(&version.listing_id).map_err(|e| {
            PlacemarkError::store(format!(
                "Invalid listing id '{}': {}",
                version.listing_id, e
            ))
        })?;

        let document = VersionDocument {
            id: ObjectId::new(),
            listing_id,
            version: version.version,
            listing: version.listing.clone(),
            created_at: version.created_at,
            updated_at: version.updated_at,
        };
        self.collection
            .insert_one(&document, None)
            .await
            .map_err(|e| store_err("Failed to insert version", e))?;
        Ok(())
    }

    async fn for_listing(&self, listing_id: &str) -> PlacemarkResult<Vec<ListingVersion>> {
        let object_id = match ObjectId::parse_str(listing_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Vec::new()),
        };

        let options = FindOptions::builder().sort(doc! { "version": -1 }).build();
        let mut cursor = self
            .collection
            .find(doc! { "listingId": object_id }, options)
            .await
            .map_err(|e| store_err("Failed to list versions", e))?;

        let mut versions = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| store_err("Cursor error", e))?
        {
            let document = cursor
                .deserialize_current()
                .map_err(|e| store_err("Failed to deserialize version", e))?;
            versions.push(document.into_version());
        }
        Ok(versions)
    }

    async fn latest(&self, listing_id: &str) -> PlacemarkResult<Option<ListingVersion>> {
        let object_id = match ObjectId::parse_str(listing_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let options = FindOneOptions::builder().sort(doc! { "version": -1 }).build();
        let found = self
            .collection
            .find_one(doc! { "listingId": object_id }, options)
            .await
            .map_err(|e| store_err("Failed to find latest version", e))?;
        Ok(found.map(VersionDocument::into_version))
    }
}
