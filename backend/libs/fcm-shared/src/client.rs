use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::ServiceAccountAuth;
use crate::errors::FCMError;
use crate::models::*;

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// Firebase Cloud Messaging Client
///
/// Sends notifications through the FCM HTTP v1 API. Authentication is
/// delegated to a shared [`ServiceAccountAuth`].
pub struct FCMClient {
    pub project_id: String,
    base_url: String,
    auth: Arc<ServiceAccountAuth>,
    http_client: reqwest::Client,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `auth` - Service-account authentication shared with other Google clients
    pub fn new(project_id: String, auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            project_id,
            base_url: DEFAULT_FCM_BASE_URL.to_string(),
            auth,
            http_client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different FCM endpoint (local fakes, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }

    /// Build the HTTP v1 request body for a single device.
    pub fn build_message(device_token: &str, message: &PushMessage) -> FcmMessage {
        let android = message.click_action.as_ref().map(|action| {
            serde_json::json!({
                "notification": { "click_action": action }
            })
        });
        let apns = message.click_action.as_ref().map(|action| {
            serde_json::json!({
                "payload": { "aps": { "category": action } }
            })
        });

        FcmMessage {
            message: FcmMessageContent {
                token: device_token.to_string(),
                notification: FcmNotification {
                    title: message.title.clone(),
                    body: message.body.clone(),
                },
                data: message.data.clone(),
                android,
                apns,
            },
        }
    }

    /// Send notification via FCM to a single device
    pub async fn send(
        &self,
        device_token: &str,
        message: &PushMessage,
    ) -> Result<FCMSendResult, FCMError> {
        if !self.validate_token(device_token) {
            return Err(FCMError::InvalidToken);
        }

        let access_token = self.auth.access_token().await?;
        let request = Self::build_message(device_token, message);

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let fcm_response: FcmApiResponse = response
                    .json()
                    .await
                    .map_err(|e| FCMError::ResponseParseError(e.to_string()))?;

                let message_id = fcm_response
                    .name
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                debug!("FCM accepted message {}", message_id);

                Ok(FCMSendResult { message_id })
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(FCMError::ApiError(status.to_string(), error_text))
            }
        }
    }

    /// Validate device token format
    pub fn validate_token(&self, device_token: &str) -> bool {
        // FCM registration tokens are typically 100-200 characters
        !device_token.trim().is_empty() && device_token.len() <= 4096
    }
}
