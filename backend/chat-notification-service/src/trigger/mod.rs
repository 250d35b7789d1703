//! Document-path trigger patterns and the created-document event envelope.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::firestore::FirestoreDocument;
use crate::services::MessageCreated;

/// Path pattern for new chat messages
pub const MESSAGE_CREATED_PATTERN: &str = "chats/{chatId}/messages/{messageId}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A document path pattern such as `chats/{chatId}/messages/{messageId}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPattern {
    segments: Vec<Segment>,
}

impl TriggerPattern {
    pub fn parse(pattern: &str) -> AppResult<Self> {
        let segments = pattern
            .trim_matches('/')
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(AppError::Config(format!(
                        "empty segment in trigger pattern {:?}",
                        pattern
                    )));
                }
                Ok(match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                    Some(_) => {
                        return Err(AppError::Config(format!(
                            "unnamed parameter in trigger pattern {:?}",
                            pattern
                        )))
                    }
                    None => Segment::Literal(segment.to_string()),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Match a relative document path or a full resource name
    /// (`projects/{p}/databases/{d}/documents/...`), returning the bound
    /// parameters.
    pub fn matches(&self, document: &str) -> Option<HashMap<String, String>> {
        let relative = match document.find("/documents/") {
            Some(idx) => &document[idx + "/documents/".len()..],
            None => document,
        };
        let parts: Vec<&str> = relative.trim_matches('/').split('/').collect();

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

/// Document-created event as delivered to the trigger endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentCreatedEvent {
    /// Path or resource name of the created document
    pub document: String,
    /// Created document; absent when the event carried no snapshot
    #[serde(default)]
    pub value: Option<FirestoreDocument>,
}

impl DocumentCreatedEvent {
    /// Bind the event to the message-created pattern.
    pub fn into_message_created(self, pattern: &TriggerPattern) -> AppResult<MessageCreated> {
        let mut params = pattern.matches(&self.document).ok_or_else(|| {
            AppError::BadRequest(format!(
                "document {:?} does not match {}",
                self.document, MESSAGE_CREATED_PATTERN
            ))
        })?;

        let chat_id = params.remove("chatId");
        let message_id = params.remove("messageId");
        let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
            return Err(AppError::BadRequest(
                "trigger pattern must bind chatId and messageId".to_string(),
            ));
        };

        Ok(MessageCreated {
            chat_id,
            message_id,
            data: self.value.map(FirestoreDocument::into_document),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_pattern() -> TriggerPattern {
        TriggerPattern::parse(MESSAGE_CREATED_PATTERN).unwrap()
    }

    #[test]
    fn test_matches_relative_path() {
        let params = message_pattern().matches("chats/c1/messages/m1").unwrap();
        assert_eq!(params.get("chatId").map(String::as_str), Some("c1"));
        assert_eq!(params.get("messageId").map(String::as_str), Some("m1"));
    }

    #[test]
    fn test_matches_resource_name() {
        let params = message_pattern()
            .matches("projects/chat-app/databases/(default)/documents/chats/c1/messages/m1")
            .unwrap();
        assert_eq!(params.get("chatId").map(String::as_str), Some("c1"));
    }

    #[test]
    fn test_rejects_other_paths() {
        let pattern = message_pattern();
        assert!(pattern.matches("chats/c1").is_none());
        assert!(pattern.matches("users/u1/messages/m1").is_none());
        assert!(pattern.matches("chats/c1/messages/m1/reactions/r1").is_none());
        assert!(pattern.matches("chats//messages/m1").is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(TriggerPattern::parse("chats//messages").is_err());
        assert!(TriggerPattern::parse("chats/{}/messages").is_err());
    }

    #[test]
    fn test_event_into_message_created() {
        let event: DocumentCreatedEvent = serde_json::from_value(json!({
            "document": "chats/c1/messages/m1",
            "value": {
                "fields": {
                    "author": { "mapValue": { "fields": { "id": { "stringValue": "A" } } } },
                    "text": { "stringValue": "hi" }
                }
            }
        }))
        .unwrap();

        let created = event.into_message_created(&message_pattern()).unwrap();
        assert_eq!(created.chat_id, "c1");
        assert_eq!(created.message_id, "m1");
        let data = created.data.unwrap();
        assert_eq!(data["text"], json!("hi"));
        assert_eq!(data["author"]["id"], json!("A"));
    }

    #[test]
    fn test_event_without_value() {
        let event: DocumentCreatedEvent = serde_json::from_value(json!({
            "document": "chats/c1/messages/m1",
            "value": null
        }))
        .unwrap();

        let created = event.into_message_created(&message_pattern()).unwrap();
        assert!(created.data.is_none());
    }

    #[test]
    fn test_event_with_mismatched_path() {
        let event: DocumentCreatedEvent =
            serde_json::from_value(json!({"document": "users/u1"})).unwrap();
        assert!(matches!(
            event.into_message_created(&message_pattern()),
            Err(AppError::BadRequest(_))
        ));
    }
}
