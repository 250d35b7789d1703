/// Push delivery gateway
///
/// The dispatcher hands a finished [`NotificationPayload`] to a
/// [`PushGateway`]; the FCM implementation maps it onto an HTTP v1 message.
use async_trait::async_trait;
use fcm_shared::{FCMClient, PushMessage};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::logging::redact_token;
use crate::models::NotificationPayload;

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver `payload` to one device and return the provider's message id.
    async fn send_to_device(
        &self,
        device_token: &str,
        payload: &NotificationPayload,
    ) -> AppResult<String>;
}

/// [`PushGateway`] backed by Firebase Cloud Messaging
pub struct FcmPushGateway {
    client: Arc<FCMClient>,
}

impl FcmPushGateway {
    pub fn new(client: Arc<FCMClient>) -> Self {
        Self { client }
    }

    pub fn to_push_message(payload: &NotificationPayload) -> PushMessage {
        PushMessage {
            title: payload.notification.title.clone(),
            body: payload.notification.body.clone(),
            click_action: Some(payload.notification.click_action.clone())
                .filter(|action| !action.is_empty()),
            data: payload.data_map(),
        }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send_to_device(
        &self,
        device_token: &str,
        payload: &NotificationPayload,
    ) -> AppResult<String> {
        let message = Self::to_push_message(payload);

        match self.client.send(device_token, &message).await {
            Ok(result) => {
                debug!(
                    "FCM delivery to {} accepted: {}",
                    redact_token(device_token),
                    result.message_id
                );
                Ok(result.message_id)
            }
            Err(e) => {
                if e.is_token_rejection() {
                    warn!(
                        "FCM rejected device token {}: {}",
                        redact_token(device_token),
                        e
                    );
                } else {
                    warn!("FCM delivery to {} failed: {}", redact_token(device_token), e);
                }
                Err(e.into())
            }
        }
    }
}
