use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Untyped key/value document as read from the document store
pub type Document = serde_json::Map<String, Value>;

pub const CHATS_COLLECTION: &str = "chats";
pub const USERS_COLLECTION: &str = "users";

/// A chat message document (`chats/{chatId}/messages/{messageId}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author_id: String,
    pub text: String,
}

impl ChatMessage {
    /// Extract the fields the notifier needs.
    ///
    /// Returns `None` when the author reference or the text is missing.
    /// An empty text counts as missing.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let author_id = author_id(doc.get("author")?)?;
        let text = doc.get("text")?.as_str().filter(|t| !t.is_empty())?;

        Some(Self {
            author_id,
            text: text.to_string(),
        })
    }
}

/// The author is either an embedded user object with an `id`, or a document
/// reference whose last path segment is the user id.
fn author_id(author: &Value) -> Option<String> {
    match author {
        Value::Object(map) => map.get("id")?.as_str().map(str::to_string),
        Value::String(path) => path
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// A two-party chat document (`chats/{chatId}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// In document order; `None` marks an entry that is not a string
    pub participants: Vec<Option<String>>,
}

impl Chat {
    /// Returns `None` when `participants` is absent or not an array.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let participants = doc
            .get("participants")?
            .as_array()?
            .iter()
            .map(|p| p.as_str().map(str::to_string))
            .collect();

        Some(Self { participants })
    }

    /// First participant that is not the author. The search is positional:
    /// when that entry is empty or not a string there is no recipient, even
    /// if a later entry is a valid id.
    pub fn recipient_for(&self, author_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|uid| uid.as_deref() != Some(author_id))?
            .as_deref()
            .filter(|uid| !uid.is_empty())
    }
}

/// A user profile document (`users/{userId}`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub fcm_token: Option<String>,
    pub name: Option<String>,
}

impl UserProfile {
    pub fn from_document(doc: &Document) -> Self {
        let fcm_token = doc
            .get("fcmToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let name = match doc.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self { fcm_token, name }
    }
}

/// Notification block of the push payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub click_action: String,
}

/// Data block of the push payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub chat_id: String,
    pub author_id: String,
}

/// Push payload sent to the recipient's device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification: NotificationContent,
    pub data: NotificationData,
}

impl NotificationPayload {
    /// Build the "new message" payload. A missing author name still
    /// produces a notification, titled with an empty name.
    pub fn new_message(
        author_name: Option<&str>,
        text: &str,
        click_action: &str,
        chat_id: &str,
        author_id: &str,
    ) -> Self {
        Self {
            notification: NotificationContent {
                title: format!("{} sent you a message", author_name.unwrap_or_default()),
                body: text.to_string(),
                click_action: click_action.to_string(),
            },
            data: NotificationData {
                chat_id: chat_id.to_string(),
                author_id: author_id.to_string(),
            },
        }
    }

    pub fn data_map(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert("chatId".to_string(), self.data.chat_id.clone());
        data.insert("authorId".to_string(), self.data.author_id.clone());
        data
    }
}

/// Why an invocation ended without sending anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Message data absent, or without author/text
    InvalidMessage,
    /// Chat document missing or without `participants`
    NoParticipants,
    /// No participant other than the author
    NoRecipient,
    /// Recipient has no device token
    NoDeviceToken,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidMessage => "invalid_message",
            SkipReason::NoParticipants => "no_participants",
            SkipReason::NoRecipient => "no_recipient",
            SkipReason::NoDeviceToken => "no_device_token",
        }
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent {
        message_id: String,
        recipient_id: String,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl DispatchOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        DispatchOutcome::Skipped { reason }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent { .. } => "sent",
            DispatchOutcome::Skipped { reason } => reason.as_str(),
        }
    }
}
