// SPDX-License-Identifier: MIT

//! Config-store integration tests against a real MongoDB instance.
//!
//! Gated on `MONGODB_TEST_URI`; each test is skipped when no instance is
//! reachable. Exercises the `$set`+upsert path that the offline mock
//! cannot cover.

use chrono::DateTime;
use crosspost_gateway::db::mongo::MongoDb;
use crosspost_gateway::models::config::StoredConfigPayload;
use std::time::Duration;

fn mongo_uri() -> Option<String> {
    std::env::var("MONGODB_TEST_URI").ok()
}

macro_rules! require_mongo {
    () => {
        match mongo_uri() {
            Some(uri) => uri,
            None => {
                eprintln!("⚠️  Skipping: MONGODB_TEST_URI not set");
                return;
            }
        }
    };
}

async fn test_db(uri: &str) -> MongoDb {
    MongoDb::connect(uri, "cross-poster-test")
        .await
        .expect("Failed to connect to MongoDB")
}

fn payload(ciphertext: &str) -> StoredConfigPayload {
    StoredConfigPayload {
        encrypted_data: ciphertext.to_string(),
        iv: "aXYtYnl0ZXM=".to_string(),
        salt: "c2FsdC1ieXRlcw==".to_string(),
        version: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn saving_twice_upserts_a_single_document() {
    let uri = require_mongo!();
    let db = test_db(&uri).await;
    let user_id = format!("it-upsert-{}", std::process::id());
    db.delete_config(&user_id).await.unwrap();

    db.save_config(&user_id, payload("cipher-one")).await.unwrap();
    let first = db
        .get_config(&user_id)
        .await
        .unwrap()
        .expect("first save stored a document");
    assert_eq!(first.encrypted_data, "cipher-one");
    assert_eq!(first.version.as_deref(), Some("1.0"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    db.save_config(&user_id, payload("cipher-two")).await.unwrap();
    let second = db
        .get_config(&user_id)
        .await
        .unwrap()
        .expect("second save kept the document");
    assert_eq!(second.encrypted_data, "cipher-two");

    // The server-side timestamp advanced across the two saves.
    let t1 = DateTime::parse_from_rfc3339(first.updated_at.as_deref().unwrap()).unwrap();
    let t2 = DateTime::parse_from_rfc3339(second.updated_at.as_deref().unwrap()).unwrap();
    assert!(t2 > t1);

    // One delete empties the store for this user, so the two saves
    // produced exactly one document rather than a duplicate.
    assert!(db.has_config(&user_id).await.unwrap());
    db.delete_config(&user_id).await.unwrap();
    assert!(!db.has_config(&user_id).await.unwrap());
    assert!(db.get_config(&user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let uri = require_mongo!();
    let db = test_db(&uri).await;
    let user_id = format!("it-delete-{}", std::process::id());

    db.save_config(&user_id, payload("cipher")).await.unwrap();
    db.delete_config(&user_id).await.unwrap();
    // Second delete of an absent document is not an error.
    db.delete_config(&user_id).await.unwrap();
    assert!(!db.has_config(&user_id).await.unwrap());
}

#[tokio::test]
async fn caller_version_is_preserved_over_the_default() {
    let uri = require_mongo!();
    let db = test_db(&uri).await;
    let user_id = format!("it-version-{}", std::process::id());
    db.delete_config(&user_id).await.unwrap();

    let mut custom = payload("cipher");
    custom.version = Some("2.3".to_string());
    db.save_config(&user_id, custom).await.unwrap();

    let stored = db.get_config(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.version.as_deref(), Some("2.3"));

    db.delete_config(&user_id).await.unwrap();
}
