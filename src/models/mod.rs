// SPDX-License-Identifier: MIT

//! Data models shared across routes and services.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod telegram;
pub mod vk;

pub use auth::{AuthCredentials, AuthResponse, AuthSession, AuthTokens, AuthUser, TokenPair};
pub use config::{StoredConfigDocument, StoredConfigPayload};
pub use envelope::Envelope;
