// SPDX-License-Identifier: MIT

//! MongoDB client wrapper with typed config-store operations.
//!
//! One encrypted configuration document per user, keyed by `userId` with a
//! unique index so concurrent saves for the same user upsert instead of
//! duplicating. The handle is built once at startup and injected through
//! `AppState`.

use crate::db::collections;
use crate::error::AppError;
use crate::models::config::{StoredConfigDocument, StoredConfigPayload};
use mongodb::bson::doc;
use mongodb::options::{CountOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};

const DEFAULT_CONFIG_VERSION: &str = "1.0";

/// Document database client.
#[derive(Clone)]
pub struct MongoDb {
    configs: Option<Collection<StoredConfigDocument>>,
}

impl MongoDb {
    /// Connect and ensure the unique `userId` index exists.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let configs = client
            .database(db_name)
            .collection::<StoredConfigDocument>(collections::USER_CONFIGS);

        let index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        configs
            .create_index(index)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create userId index: {}", e)))?;

        tracing::info!(db = db_name, "Connected to MongoDB");

        Ok(Self {
            configs: Some(configs),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { configs: None }
    }

    fn collection(&self) -> Result<&Collection<StoredConfigDocument>, AppError> {
        self.configs
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Upsert the config document for a user, stamping `version` and
    /// `updatedAt` server-side. The payload stays opaque ciphertext.
    pub async fn save_config(
        &self,
        user_id: &str,
        payload: StoredConfigPayload,
    ) -> Result<(), AppError> {
        let stored = StoredConfigDocument {
            user_id: user_id.to_string(),
            encrypted_data: payload.encrypted_data,
            iv: payload.iv,
            salt: payload.salt,
            version: payload
                .version
                .unwrap_or_else(|| DEFAULT_CONFIG_VERSION.to_string()),
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        let update = doc! {
            "$set": mongodb::bson::to_document(&stored)
                .map_err(|e| AppError::Database(format!("Serialize config: {}", e)))?
        };

        self.collection()?
            .update_one(doc! { "userId": user_id }, update)
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Fetch the stored payload for a user, sans the key field.
    pub async fn get_config(&self, user_id: &str) -> Result<Option<StoredConfigPayload>, AppError> {
        let document = self
            .collection()?
            .find_one(doc! { "userId": user_id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(document.map(StoredConfigDocument::into_payload))
    }

    /// Remove the config document; no error when absent.
    pub async fn delete_config(&self, user_id: &str) -> Result<(), AppError> {
        self.collection()?
            .delete_one(doc! { "userId": user_id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Existence check via a bounded count query.
    pub async fn has_config(&self, user_id: &str) -> Result<bool, AppError> {
        let count = self
            .collection()?
            .count_documents(doc! { "userId": user_id })
            .with_options(CountOptions::builder().limit(1).build())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }
}
