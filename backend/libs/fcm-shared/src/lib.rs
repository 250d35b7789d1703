/// FCM Shared Library
///
/// This library provides the Firebase Cloud Messaging (FCM) HTTP v1 client
/// used to deliver chat push notifications, together with the Google
/// service-account authentication every Google API client in the workspace
/// shares.
///
/// It handles:
/// - OAuth2 token generation using Google service accounts
/// - Token caching with automatic refresh
/// - Single-device message delivery with Android/APNs click routing
/// - Device token validation

pub mod auth;
pub mod client;
pub mod models;
pub mod errors;

pub use auth::{ServiceAccountAuth, CLOUD_PLATFORM_SCOPE};
pub use client::FCMClient;
pub use models::{FCMSendResult, PushMessage, ServiceAccountKey};
pub use errors::FCMError;
