// SPDX-License-Identifier: MIT

//! Auth service: identity provider calls plus internal token minting.
//!
//! Every successful provider session is re-wrapped into an internal
//! session token via the session codec. Nothing is retried except the
//! single refresh-then-retry path in `update_profile`.

use crate::error::Result;
use crate::models::auth::{
    AuthCredentials, AuthResponse, AuthSession, SessionClaims, UpdateProfilePayload,
};
use crate::services::firebase::FirebaseAuthProvider;
use crate::services::session::SessionCodec;

#[derive(Clone)]
pub struct AuthService {
    provider: FirebaseAuthProvider,
    codec: SessionCodec,
}

impl AuthService {
    pub fn new(provider: FirebaseAuthProvider, codec: SessionCodec) -> Self {
        Self { provider, codec }
    }

    fn build_response(&self, session: &AuthSession) -> Result<AuthResponse> {
        Ok(AuthResponse {
            user: session.user.clone(),
            tokens: self.codec.mint(&session.user, &session.tokens)?,
        })
    }

    pub async fn sign_in(&self, credentials: &AuthCredentials) -> Result<AuthResponse> {
        let session = self
            .provider
            .sign_in(&credentials.email, &credentials.password)
            .await?;
        self.build_response(&session)
    }

    pub async fn sign_up(&self, credentials: &AuthCredentials) -> Result<AuthResponse> {
        let session = self
            .provider
            .sign_up(&credentials.email, &credentials.password)
            .await?;
        self.build_response(&session)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse> {
        let session = self.provider.refresh_session(refresh_token).await?;
        self.build_response(&session)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.provider.send_password_reset(email).await
    }

    /// Update the profile behind the caller's session.
    ///
    /// When the provider reports an expired id token, refresh once with
    /// the sealed refresh token and retry; the response is then minted
    /// from the refreshed pair so the caller gets a usable session back.
    pub async fn update_profile(
        &self,
        claims: &SessionClaims,
        profile: &UpdateProfilePayload,
    ) -> Result<AuthResponse> {
        let pair = self.codec.open(&claims.sealed_firebase)?;

        match self.provider.update_profile(&pair.id_token, profile).await {
            Ok(updated) => {
                let session = AuthSession {
                    user: crate::models::auth::AuthUser {
                        uid: claims.user.uid.clone(),
                        email: claims.user.email.clone(),
                        display_name: updated.display_name,
                        photo_url: updated.photo_url,
                    },
                    tokens: pair,
                };
                self.build_response(&session)
            }
            Err(err) if err.is_token_expired() => {
                tracing::info!(uid = %claims.user.uid, "Id token expired, refreshing before profile update");

                let refreshed = self.provider.refresh_session(&pair.refresh_token).await?;
                let updated = self
                    .provider
                    .update_profile(&refreshed.tokens.id_token, profile)
                    .await?;

                let session = AuthSession {
                    user: crate::models::auth::AuthUser {
                        uid: refreshed.user.uid,
                        email: refreshed.user.email,
                        display_name: updated.display_name,
                        photo_url: updated.photo_url,
                    },
                    tokens: refreshed.tokens,
                };
                self.build_response(&session)
            }
            Err(err) => Err(err),
        }
    }

    /// Verify an internal session token (signature + expiry).
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        self.codec.verify(token)
    }
}
