use async_trait::async_trait;
use chat_notification_service::models::{Document, NotificationPayload};
use chat_notification_service::{AppError, AppResult, DocumentStore, PushGateway};
use fcm_shared::FCMError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[allow(dead_code)]
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// In-memory document store that records every read
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: HashMap<String, Document>,
    reads: Mutex<Vec<String>>,
    failing: Option<String>,
}

#[allow(dead_code)]
impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.documents.insert(path.to_string(), doc(value));
        self
    }

    /// Reads of `path` fail with a store error
    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing = Some(path.to_string());
        self
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let path = format!("{collection}/{id}");
        self.reads.lock().unwrap().push(path.clone());

        if self.failing.as_deref() == Some(path.as_str()) {
            return Err(AppError::DocumentStore(format!("GET {path} failed: 503")));
        }
        Ok(self.documents.get(&path).cloned())
    }
}

/// Push gateway that records deliveries instead of sending them
#[derive(Default)]
pub struct RecordingPushGateway {
    sent: Mutex<Vec<(String, NotificationPayload)>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send_to_device(
        &self,
        device_token: &str,
        payload: &NotificationPayload,
    ) -> AppResult<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((device_token.to_string(), payload.clone()));

        if self.fail {
            return Err(FCMError::ApiError(
                "503 Service Unavailable".to_string(),
                "backend unavailable".to_string(),
            )
            .into());
        }
        Ok(format!("projects/chat-app/messages/{}", sent.len()))
    }
}
