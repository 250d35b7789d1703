use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::FCMError;
use crate::models::*;

/// OAuth2 scope covering both Firestore and FCM.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Google service-account authentication.
///
/// Exchanges a self-signed JWT for an OAuth2 access token and caches it until
/// shortly before it expires. One instance is shared by every Google API
/// client in the process; the cache lock is held across the refresh so
/// concurrent callers trigger a single token request.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountKey,
    token_cache: Mutex<Option<TokenCache>>,
    http_client: reqwest::Client,
}

impl ServiceAccountAuth {
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            credentials,
            token_cache: Mutex::new(None),
            http_client: reqwest::Client::new(),
        }
    }

    /// Load a service-account JSON key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FCMError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        let credentials: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(credentials))
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Get access token from service account (with caching)
    pub async fn access_token(&self) -> Result<String, FCMError> {
        let mut cache = self.token_cache.lock().await;

        let now = Utc::now().timestamp();
        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(now) {
                return Ok(cached.access_token.clone());
            }
        }

        debug!(
            "Refreshing Google access token for {}",
            self.credentials.client_email
        );

        let assertion = self.signed_assertion()?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FCMError::TokenRequestFailed(response.status().to_string()));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FCMError::TokenParseError(e.to_string()))?;

        *cache = Some(TokenCache {
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now().timestamp() + token_response.expires_in,
        });

        Ok(token_response.access_token)
    }

    /// Build the RS256-signed JWT sent to the token endpoint.
    fn signed_assertion(&self) -> Result<String, FCMError> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FCMError::KeyParseError(e.to_string()))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());

        encode(&header, &claims, &encoding_key).map_err(|e| FCMError::JwtEncodeError(e.to_string()))
    }

    #[cfg(test)]
    async fn seed_cache(&self, cache: TokenCache) {
        *self.token_cache.lock().await = Some(cache);
    }
}
