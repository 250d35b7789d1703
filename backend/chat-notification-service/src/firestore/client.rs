use async_trait::async_trait;
use fcm_shared::ServiceAccountAuth;
use reqwest::Url;
use std::sync::Arc;
use tracing::debug;

use super::value::FirestoreDocument;
use crate::config::FirebaseConfig;
use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::services::DocumentStore;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// How requests are authorized
enum Credentials {
    ServiceAccount(Arc<ServiceAccountAuth>),
    /// The emulator accepts this fixed token with full access
    Emulator,
}

/// Firestore REST client implementing [`DocumentStore`]
pub struct FirestoreClient {
    base_url: String,
    project_id: String,
    database: String,
    credentials: Credentials,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    pub fn new(
        project_id: impl Into<String>,
        database: impl Into<String>,
        auth: Arc<ServiceAccountAuth>,
    ) -> Self {
        Self {
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id: project_id.into(),
            database: database.into(),
            credentials: Credentials::ServiceAccount(auth),
            http_client: reqwest::Client::new(),
        }
    }

    /// Client for a local emulator at `host:port`
    pub fn emulator(
        host: &str,
        project_id: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            base_url: format!("http://{}", host.trim_end_matches('/')),
            project_id: project_id.into(),
            database: database.into(),
            credentials: Credentials::Emulator,
            http_client: reqwest::Client::new(),
        }
    }

    /// Emulator when `emulator_host` is set, production Firestore otherwise
    pub fn from_config(config: &FirebaseConfig, auth: Arc<ServiceAccountAuth>) -> Self {
        match &config.emulator_host {
            Some(host) => Self::emulator(host, &config.project_id, &config.database),
            None => Self::new(&config.project_id, &config.database, auth),
        }
    }

    /// Every component becomes exactly one percent-encoded path segment
    pub fn document_url(&self, collection: &str, id: &str) -> AppResult<Url> {
        let invalid = || AppError::Config(format!("invalid Firestore URL {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
                "documents",
                collection,
                id,
            ]);
        Ok(url)
    }

    async fn bearer_token(&self) -> AppResult<String> {
        match &self.credentials {
            Credentials::ServiceAccount(auth) => auth
                .access_token()
                .await
                .map_err(|e| AppError::DocumentStore(e.to_string())),
            Credentials::Emulator => Ok("owner".to_string()),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        // Not valid Firestore ids; a URL segment of `.` or `..` would be dropped
        if matches!(id, "" | "." | "..") {
            debug!("Document id {:?} in {} cannot exist", id, collection);
            return Ok(None);
        }

        let url = self.document_url(collection, id)?;
        let token = self.bearer_token().await?;

        let response = self.http_client.get(url).bearer_auth(token).send().await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                debug!("Document {}/{} not found", collection, id);
                Ok(None)
            }
            status if status.is_success() => {
                let document: FirestoreDocument = response.json().await?;
                Ok(Some(document.into_document()))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(AppError::DocumentStore(format!(
                    "GET {}/{} failed: {} - {}",
                    collection, id, status, body
                )))
            }
        }
    }
}
