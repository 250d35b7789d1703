/// New-message notification dispatcher
///
/// Invoked once per created message document. Every missing precondition is
/// a silent skip; only a failed read or a failed push propagates as `Err`.
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::DEFAULT_CLICK_ACTION;
use crate::error::AppResult;
use crate::logging::redact_token;
use crate::metrics;
use crate::models::{
    Chat, ChatMessage, DispatchOutcome, Document, NotificationPayload, SkipReason, UserProfile,
    CHATS_COLLECTION, USERS_COLLECTION,
};
use crate::services::{DocumentStore, PushGateway};

/// A message-created trigger invocation
#[derive(Debug, Clone)]
pub struct MessageCreated {
    pub chat_id: String,
    pub message_id: String,
    /// Created document data; `None` when the event carried no snapshot
    pub data: Option<Document>,
}

pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushGateway>,
    click_action: String,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, push: Arc<dyn PushGateway>) -> Self {
        Self {
            store,
            push,
            click_action: DEFAULT_CLICK_ACTION.to_string(),
        }
    }

    pub fn with_click_action(mut self, click_action: impl Into<String>) -> Self {
        self.click_action = click_action.into();
        self
    }

    /// Handle one message-created event.
    #[instrument(skip(self, event), fields(chat_id = %event.chat_id, message_id = %event.message_id))]
    pub async fn on_message_created(&self, event: &MessageCreated) -> AppResult<DispatchOutcome> {
        let result = self.dispatch(event).await;
        match &result {
            Ok(outcome) => metrics::record_dispatch(outcome.label()),
            Err(_) => metrics::record_dispatch("failed"),
        }
        result
    }

    async fn dispatch(&self, event: &MessageCreated) -> AppResult<DispatchOutcome> {
        let Some(message) = event.data.as_ref().and_then(ChatMessage::from_document) else {
            debug!("Message has no data, author or text; skipping");
            return Ok(DispatchOutcome::skipped(SkipReason::InvalidMessage));
        };

        let chat = self
            .store
            .get(CHATS_COLLECTION, &event.chat_id)
            .await?
            .as_ref()
            .and_then(Chat::from_document);
        let Some(chat) = chat else {
            debug!("Chat has no participants; skipping");
            return Ok(DispatchOutcome::skipped(SkipReason::NoParticipants));
        };

        let Some(recipient_id) = chat.recipient_for(&message.author_id) else {
            debug!("No recipient besides author {}; skipping", message.author_id);
            return Ok(DispatchOutcome::skipped(SkipReason::NoRecipient));
        };

        let recipient = self.load_user(recipient_id).await?;
        let Some(device_token) = recipient.fcm_token else {
            debug!("Recipient {} has no device token; skipping", recipient_id);
            return Ok(DispatchOutcome::skipped(SkipReason::NoDeviceToken));
        };

        // The author's name is not guarded: a missing name still notifies.
        let author = self.load_user(&message.author_id).await?;

        let payload = NotificationPayload::new_message(
            author.name.as_deref(),
            &message.text,
            &self.click_action,
            &event.chat_id,
            &message.author_id,
        );

        let message_id = self.push.send_to_device(&device_token, &payload).await?;

        info!(
            "Sent new-message notification {} to {} ({})",
            message_id,
            recipient_id,
            redact_token(&device_token)
        );

        Ok(DispatchOutcome::Sent {
            message_id,
            recipient_id: recipient_id.to_string(),
        })
    }

    async fn load_user(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(self
            .store
            .get(USERS_COLLECTION, user_id)
            .await?
            .as_ref()
            .map(UserProfile::from_document)
            .unwrap_or_default())
    }
}
