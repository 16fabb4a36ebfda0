//! Integration tests against a live MongoDB.
//!
//! Run with `MONGO_URI=mongodb://localhost:27017 cargo test -- --ignored`.
//! Each run works in a throwaway database that is dropped at the end.

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use placemark_core::{Directory, Listing};
use placemark_stores::{connect_client, MongoConfig, MongoRecordStore, MongoVersionStore};

fn cafe() -> Listing {
    Listing::new("Cafe Good Vibes")
        .with_address("123 Coffee St")
        .with_phone_number("555-1234")
        .with_website("http://cafegoodvibes.com")
        .with_rating(4.5)
        .with_review("Great place!")
        .with_review("Love the coffee!")
        .with_opening_hours("8am - 8pm")
        .with_photo("photo1.jpg")
        .with_photo("photo2.jpg")
}

#[tokio::test]
#[ignore = "requires a running MongoDB (set MONGO_URI)"]
async fn save_protocol_round_trip() {
    let mut config = MongoConfig::from_env().expect("MONGO_URI must be set");
    config.database = format!("placemark_test_{}", ObjectId::new().to_hex());

    let client = connect_client(&config).await.unwrap();
    let records = Arc::new(
        MongoRecordStore::new(&client, &config.database)
            .await
            .unwrap(),
    );
    let versions = Arc::new(
        MongoVersionStore::new(&client, &config.database)
            .await
            .unwrap(),
    );
    let directory = Directory::new(records, versions);

    // First save creates the live record at version 1.
    let first = directory.save(cafe()).await.unwrap();
    assert_eq!(first.meta.current_version, 1);
    assert!(directory.get_versions(&first.id).await.unwrap().is_empty());

    // A changed payload advances the record and archives the prior state.
    let second = directory.save(cafe().with_rating(4.7)).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.meta.current_version, 2);

    let archived = directory.get_versions(&first.id).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].version, 1);
    assert_eq!(archived[0].listing, first.listing);

    // An identical payload is a no-op.
    let third = directory.save(cafe().with_rating(4.7)).await.unwrap();
    assert_eq!(third.meta.current_version, 2);
    assert_eq!(directory.get_versions(&first.id).await.unwrap().len(), 1);

    // Lookups by URL and id resolve to the same live record.
    let by_url = directory
        .get_by_url("http://cafegoodvibes.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_url.id, first.id);
    assert_eq!(by_url.meta.current_version, 2);

    let by_id = directory.get_by_id(&first.id).await.unwrap().unwrap();
    assert_eq!(by_id.listing.rating, Some(4.7));

    client.database(&config.database).drop(None).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB (set MONGO_URI)"]
async fn distinct_identities_stay_separate() {
    let mut config = MongoConfig::from_env().expect("MONGO_URI must be set");
    config.database = format!("placemark_test_{}", ObjectId::new().to_hex());

    let client = connect_client(&config).await.unwrap();
    let records = Arc::new(
        MongoRecordStore::new(&client, &config.database)
            .await
            .unwrap(),
    );
    let versions = Arc::new(
        MongoVersionStore::new(&client, &config.database)
            .await
            .unwrap(),
    );
    let directory = Directory::new(records, versions);

    let a = directory.save(cafe()).await.unwrap();
    let b = directory
        .save(
            Listing::new("Tea Corner")
                .with_website("http://teacorner.example")
                .with_rating(4.1),
        )
        .await
        .unwrap();

    assert_ne!(a.id, b.id);
    assert_ne!(a.url_hash, b.url_hash);
    assert_eq!(
        directory
            .get_by_url("http://teacorner.example")
            .await
            .unwrap()
            .unwrap()
            .id,
        b.id
    );

    client.database(&config.database).drop(None).await.unwrap();
}
