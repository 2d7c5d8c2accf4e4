// SPDX-License-Identifier: MIT

//! Identity provider REST client.
//!
//! Thin adapter over the provider's accounts/token endpoints. Every
//! failure surfaces as `AppError::Provider` tagged with the operation;
//! the provider's own reason string (e.g. `EMAIL_NOT_FOUND`,
//! `TOKEN_EXPIRED`) is carried as the cause.

use crate::error::{AppError, ProviderOp, Result};
use crate::models::auth::{AuthSession, AuthUser, TokenPair, UpdateProfilePayload};
use serde::Deserialize;
use serde_json::json;

/// Account payload returned by sign-in/sign-up/update calls.
#[derive(Debug, Clone, Deserialize)]
struct ProviderAccount {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "photoUrl", default)]
    photo_url: Option<String>,
    #[serde(rename = "idToken", default)]
    id_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderLookupResponse {
    #[serde(default)]
    users: Vec<ProviderAccount>,
}

#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    #[serde(default)]
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ProviderAccount {
    fn into_user(self) -> AuthUser {
        AuthUser {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
        }
    }

    fn into_session(self, op: ProviderOp) -> Result<AuthSession> {
        let id_token = self.id_token.clone().ok_or_else(|| AppError::Provider {
            op,
            message: "MISSING_ID_TOKEN".to_string(),
        })?;
        let refresh_token = self.refresh_token.clone().ok_or_else(|| AppError::Provider {
            op,
            message: "MISSING_REFRESH_TOKEN".to_string(),
        })?;

        Ok(AuthSession {
            user: self.into_user(),
            tokens: TokenPair {
                id_token,
                refresh_token,
            },
        })
    }
}

/// Identity provider client with injected credentials and endpoints.
#[derive(Clone)]
pub struct FirebaseAuthProvider {
    http: reqwest::Client,
    api_key: String,
    identity_base: String,
    token_url: String,
}

impl FirebaseAuthProvider {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        identity_base: String,
        token_url: String,
    ) -> Self {
        Self {
            http,
            api_key,
            identity_base,
            token_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}?key={}", self.identity_base, path, self.api_key)
    }

    /// Exchange email/password for a provider session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let account: ProviderAccount = self
            .post_json(
                ProviderOp::SignIn,
                &self.endpoint("accounts:signInWithPassword"),
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        account.into_session(ProviderOp::SignIn)
    }

    /// Create an account and return its first session.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let account: ProviderAccount = self
            .post_json(
                ProviderOp::SignUp,
                &self.endpoint("accounts:signUp"),
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        account.into_session(ProviderOp::SignUp)
    }

    /// Trigger the provider's password-reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post_json(
                ProviderOp::ResetPassword,
                &self.endpoint("accounts:sendOobCode"),
                &json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                }),
            )
            .await?;
        Ok(())
    }

    /// Update display name / photo URL for the account behind `id_token`.
    pub async fn update_profile(
        &self,
        id_token: &str,
        profile: &UpdateProfilePayload,
    ) -> Result<AuthUser> {
        let account: ProviderAccount = self
            .post_json(
                ProviderOp::UpdateProfile,
                &self.endpoint("accounts:update"),
                &json!({
                    "idToken": id_token,
                    "displayName": profile.display_name,
                    "photoUrl": profile.photo_url,
                    "returnSecureToken": false,
                }),
            )
            .await?;

        Ok(account.into_user())
    }

    /// Exchange a refresh token for a fresh session, rebuilding the user
    /// via an account lookup (the token endpoint returns only tokens).
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let url = format!("{}?key={}", self.token_url, self.api_key);
        let tokens: ProviderTokenResponse = self
            .post_json(
                ProviderOp::Refresh,
                &url,
                &json!({
                    "grant_type": "refresh_token",
                    "refresh_token": refresh_token,
                }),
            )
            .await?;

        let user = self.lookup_user(&tokens.id_token).await?;

        Ok(AuthSession {
            user,
            tokens: TokenPair {
                id_token: tokens.id_token,
                refresh_token: tokens.refresh_token,
            },
        })
    }

    /// Resolve the user behind an id token.
    async fn lookup_user(&self, id_token: &str) -> Result<AuthUser> {
        let response: ProviderLookupResponse = self
            .post_json(
                ProviderOp::Lookup,
                &self.endpoint("accounts:lookup"),
                &json!({ "idToken": id_token }),
            )
            .await?;

        let account = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider {
                op: ProviderOp::Lookup,
                message: "USER_NOT_FOUND".to_string(),
            })?;

        Ok(account.into_user())
    }

    /// POST a JSON body; map non-success responses to a tagged provider
    /// error carrying the provider's reason string.
    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        op: ProviderOp,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                op,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let message = match response.json::<ProviderErrorResponse>().await {
                Ok(parsed) => parsed
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "UNEXPECTED_ERROR".to_string()),
                Err(_) => "UNEXPECTED_ERROR".to_string(),
            };
            return Err(AppError::Provider { op, message });
        }

        response.json().await.map_err(|e| AppError::Provider {
            op,
            message: format!("JSON parse error: {}", e),
        })
    }
}
