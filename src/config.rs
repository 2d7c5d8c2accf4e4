// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; adapters receive their credentials
//! through constructors so no code path reads the process environment at
//! request time.

use std::env;

const DEFAULT_FIREBASE_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIREBASE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";
const DEFAULT_VK_API_BASE: &str = "https://api.vk.com/method";
const DEFAULT_VK_API_VERSION: &str = "5.199";

/// How requests to the platform adapters are authenticated.
/// Exactly one mode is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <internal session token>`
    Bearer,
    /// `x-api-key: <shared secret>`
    ApiKey,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Allowed CORS origin ("*" for permissive)
    pub cors_origin: String,
    /// Honor `x-forwarded-for` for client addressing. Only set this when
    /// a proxy the deployment controls sits in front of the server.
    pub trust_proxy: bool,
    /// Adapter authentication mode
    pub auth_mode: AuthMode,
    /// Shared secret for api-key mode
    pub api_key: Option<String>,

    // --- Document store ---
    pub mongodb_uri: String,
    pub mongodb_db: String,

    // --- Session tokens ---
    /// HS256 signing secret; the sealed-pair key is derived from it
    pub jwt_secret: String,
    /// Internal token lifetime in seconds
    pub jwt_ttl_seconds: u64,

    // --- Identity provider ---
    pub firebase_api_key: String,
    pub firebase_identity_url: String,
    pub firebase_token_url: String,

    // --- Messaging platform ---
    pub telegram_bot_token: String,
    pub telegram_api_base: String,

    // --- Social network ---
    pub vk_api_base: String,
    pub vk_api_version: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let auth_mode = match env::var("AUTH_MODE").as_deref() {
            Ok("api-key") => AuthMode::ApiKey,
            _ => AuthMode::Bearer,
        };

        let api_key = env::var("API_KEY").ok().map(|v| v.trim().to_string());
        if auth_mode == AuthMode::ApiKey && api_key.is_none() {
            return Err(ConfigError::Missing("API_KEY"));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            trust_proxy: matches!(
                env::var("TRUST_PROXY").as_deref(),
                Ok("true") | Ok("1")
            ),
            auth_mode,
            api_key,

            mongodb_uri: env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?,
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "cross-poster".to_string()),

            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            jwt_ttl_seconds: env::var("JWT_EXPIRES_IN")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),

            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            firebase_identity_url: env::var("FIREBASE_IDENTITY_URL")
                .unwrap_or_else(|_| DEFAULT_FIREBASE_IDENTITY_URL.to_string()),
            firebase_token_url: env::var("FIREBASE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_FIREBASE_TOKEN_URL.to_string()),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?,
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string()),

            vk_api_base: env::var("VK_API_BASE")
                .unwrap_or_else(|_| DEFAULT_VK_API_BASE.to_string()),
            vk_api_version: env::var("VK_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_VK_API_VERSION.to_string()),
        })
    }

    /// Default config for tests. No external endpoint is reachable.
    pub fn test_default() -> Self {
        Self {
            port: 3000,
            cors_origin: "*".to_string(),
            trust_proxy: false,
            auth_mode: AuthMode::Bearer,
            api_key: None,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "cross-poster-test".to_string(),
            jwt_secret: "test_jwt_secret_32_bytes_minimum!".to_string(),
            jwt_ttl_seconds: 3600,
            firebase_api_key: "test-api-key".to_string(),
            firebase_identity_url: "http://127.0.0.1:1/identity".to_string(),
            firebase_token_url: "http://127.0.0.1:1/token".to_string(),
            telegram_bot_token: "test-bot-token".to_string(),
            telegram_api_base: "http://127.0.0.1:1/bot".to_string(),
            vk_api_base: "http://127.0.0.1:1/method".to_string(),
            vk_api_version: "5.199".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
