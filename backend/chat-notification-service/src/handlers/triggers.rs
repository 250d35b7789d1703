use super::ApiResponse;
use crate::error::AppError;
use crate::services::NotificationDispatcher;
use crate::trigger::{DocumentCreatedEvent, TriggerPattern};
/// Trigger handlers invoked by the document-event subscription
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::error;

/// Handle a created message document
///
/// POST /api/v1/triggers/message-created
///
/// Skips answer 200 so the platform does not redeliver; a failed read or
/// push answers 500 and leaves redelivery to the platform.
pub async fn message_created(
    dispatcher: web::Data<Arc<NotificationDispatcher>>,
    pattern: web::Data<TriggerPattern>,
    event: web::Json<DocumentCreatedEvent>,
) -> Result<HttpResponse, AppError> {
    let created = event.into_inner().into_message_created(&pattern)?;

    match dispatcher.on_message_created(&created).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome))),
        Err(e) => {
            error!(
                "Notification for chats/{}/messages/{} failed: {}",
                created.chat_id, created.message_id, e
            );
            Err(e)
        }
    }
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/triggers").route("/message-created", web::post().to(message_created)),
    );
}
