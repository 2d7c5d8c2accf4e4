// SPDX-License-Identifier: MIT

//! Identity and session shapes.
//!
//! `AuthUser`/`AuthSession` mirror what the identity provider returns;
//! `SessionClaims` is the internal signed token. Field names stay in the
//! client's camelCase wire format.

use serde::{Deserialize, Serialize};

/// A user as reported by the identity provider.
///
/// `uid` is assigned by the provider and immutable; `display_name` and
/// `photo_url` change through profile updates only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// The opaque provider token pair. Never persisted server-side; only ever
/// embedded, sealed, inside the internal session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// A provider session: the user plus their live token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    pub tokens: TokenPair,
}

/// Sign-in / sign-up credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCredentials {
    pub email: String,
    pub password: String,
}

/// The minted internal token and its lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

/// Body of every successful auth operation that yields a session.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub tokens: AuthTokens,
}

/// Profile fields a caller may update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfilePayload {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Claims carried by the internal session token.
///
/// `sealed_firebase` is the AES-GCM sealed provider token pair; callers
/// open it via the session codec only when the provider-native tokens are
/// needed (profile update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: AuthUser,
    #[serde(rename = "sealedFirebase")]
    pub sealed_firebase: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}
