/// Firestore access over the REST API
pub mod client;
pub mod value;

pub use client::FirestoreClient;
pub use value::{FirestoreDocument, FirestoreValue};
