// SPDX-License-Identifier: MIT

//! Cross-posting gateway: a backend that fronts an identity provider,
//! a messaging platform, and a social network behind one uniform JSON
//! envelope, with encrypted per-user configuration in a document store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::time::Instant;

use crate::config::Config;
use crate::db::mongo::MongoDb;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::{AuthService, FirebaseAuthProvider, SessionCodec, TelegramClient, VkClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MongoDb,
    pub auth: AuthService,
    pub telegram: TelegramClient,
    pub vk: VkClient,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl AppState {
    /// Wire up all adapters from configuration, sharing one HTTP client.
    pub fn new(config: Config, db: MongoDb, http: reqwest::Client) -> Self {
        let provider = FirebaseAuthProvider::new(
            http.clone(),
            config.firebase_api_key.clone(),
            config.firebase_identity_url.clone(),
            config.firebase_token_url.clone(),
        );
        let codec = SessionCodec::new(&config.jwt_secret, config.jwt_ttl_seconds);
        let auth = AuthService::new(provider, codec);

        let telegram = TelegramClient::new(
            http.clone(),
            &config.telegram_api_base,
            &config.telegram_bot_token,
        );
        let vk = VkClient::new(http, &config.vk_api_base, &config.vk_api_version);

        Self {
            config,
            db,
            auth,
            telegram,
            vk,
            rate_limiter: RateLimiter::default(),
            started_at: Instant::now(),
        }
    }
}
