// SPDX-License-Identifier: MIT

//! Session codec: seals the provider token pair with AES-256-GCM and
//! mints/verifies the signed internal session token.
//!
//! Sealed layout: `nonce(12) ‖ tag(16) ‖ ciphertext`, base64. The sealing
//! key is the SHA-256 digest of the JWT signing secret, so one configured
//! secret drives both signing and sealing.

use crate::error::{AppError, Result};
use crate::models::auth::{AuthTokens, AuthUser, SessionClaims, TokenPair};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

const TAG_LEN: usize = 16;

/// Encodes/decodes provider sessions into internal tokens.
#[derive(Clone)]
pub struct SessionCodec {
    sealing_key: [u8; 32],
    jwt_secret: Vec<u8>,
    ttl_seconds: u64,
    rng: SystemRandom,
}

impl SessionCodec {
    pub fn new(jwt_secret: &str, ttl_seconds: u64) -> Self {
        let digest = Sha256::digest(jwt_secret.as_bytes());
        let mut sealing_key = [0u8; 32];
        sealing_key.copy_from_slice(&digest);

        Self {
            sealing_key,
            jwt_secret: jwt_secret.as_bytes().to_vec(),
            ttl_seconds,
            rng: SystemRandom::new(),
        }
    }

    /// Token lifetime reported to the client.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    fn aead_key(&self) -> Result<LessSafeKey> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.sealing_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("AEAD key setup failed")))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Seal a token pair. A fresh random nonce makes every call produce a
    /// different ciphertext for identical input.
    pub fn seal(&self, pair: &TokenPair) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Nonce generation failed")))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = serde_json::to_vec(pair)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize token pair: {}", e)))?;

        let tag = self
            .aead_key()?
            .seal_in_place_separate_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Sealing failed")))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + TAG_LEN + in_out.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(tag.as_ref());
        payload.extend_from_slice(&in_out);

        Ok(BASE64.encode(payload))
    }

    /// Open a sealed token pair. Fails on tampering, wrong key, or a
    /// malformed/truncated payload.
    pub fn open(&self, sealed: &str) -> Result<TokenPair> {
        let payload = BASE64
            .decode(sealed)
            .map_err(|_| AppError::Decryption("payload is not valid base64".to_string()))?;

        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(AppError::Decryption("payload too short".to_string()));
        }

        let (nonce_bytes, rest) = payload.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::Decryption("bad nonce".to_string()))?;

        // ring expects ciphertext ‖ tag
        let mut in_out = ciphertext.to_vec();
        in_out.extend_from_slice(tag);

        let plaintext = self
            .aead_key()?
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| AppError::Decryption("authentication tag mismatch".to_string()))?;

        serde_json::from_slice(plaintext)
            .map_err(|_| AppError::Decryption("sealed payload is not a token pair".to_string()))
    }

    /// Mint an internal session token for a user with their sealed pair.
    pub fn mint(&self, user: &AuthUser, pair: &TokenPair) -> Result<AuthTokens> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
            .as_secs();

        let claims = SessionClaims {
            user: user.clone(),
            sealed_firebase: self.seal(pair)?,
            sub: user.uid.clone(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {}", e)))?;

        Ok(AuthTokens {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    /// Verify signature and expiry; no grace window.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded = jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(decoded.claims)
    }
}
