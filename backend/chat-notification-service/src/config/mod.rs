use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub firebase: FirebaseConfig,
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Path to the service-account JSON key
    pub credentials_path: String,
    pub database: String,
    /// `host:port` of a local Firestore emulator
    pub emulator_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    pub base_url: String,
    pub click_action: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("APP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("APP_PORT={}: {}", raw, e)))?,
            None => 8080,
        };

        let project_id = var("FIREBASE_PROJECT_ID")
            .ok_or_else(|| AppError::Config("FIREBASE_PROJECT_ID not set".to_string()))?;

        // FCM has no emulator, so credentials are needed even when Firestore
        // is emulated.
        let credentials_path = var("GOOGLE_APPLICATION_CREDENTIALS").ok_or_else(|| {
            AppError::Config("GOOGLE_APPLICATION_CREDENTIALS not set".to_string())
        })?;

        Ok(Config {
            app: AppConfig {
                env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port,
            },
            firebase: FirebaseConfig {
                project_id,
                credentials_path,
                database: var("FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
                emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            },
            fcm: FcmConfig {
                base_url: var("FCM_BASE_URL")
                    .unwrap_or_else(|| fcm_shared::client::DEFAULT_FCM_BASE_URL.to_string()),
                click_action: var("FCM_CLICK_ACTION")
                    .unwrap_or_else(|| DEFAULT_CLICK_ACTION.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("FIREBASE_PROJECT_ID", "chat-app"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/sa.json"),
        ]))
        .unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.firebase.project_id, "chat-app");
        assert_eq!(config.firebase.database, "(default)");
        assert_eq!(config.firebase.credentials_path, "/secrets/sa.json");
        assert!(config.firebase.emulator_host.is_none());
        assert_eq!(config.fcm.base_url, "https://fcm.googleapis.com");
        assert_eq!(config.fcm.click_action, DEFAULT_CLICK_ACTION);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("APP_PORT", "9000"),
            ("FIREBASE_PROJECT_ID", "chat-app"),
            ("FIRESTORE_DATABASE", "chats-eu"),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8081"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/sa.json"),
            ("FCM_CLICK_ACTION", "OPEN_CHAT"),
        ]))
        .unwrap();

        assert_eq!(config.app.env, "production");
        assert_eq!(config.app.port, 9000);
        assert_eq!(config.firebase.database, "chats-eu");
        assert_eq!(
            config.firebase.emulator_host.as_deref(),
            Some("localhost:8081")
        );
        assert_eq!(config.fcm.click_action, "OPEN_CHAT");
    }

    #[test]
    fn test_missing_project_id() {
        let err = Config::from_lookup(lookup(&[(
            "GOOGLE_APPLICATION_CREDENTIALS",
            "/secrets/sa.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup(&[
            ("FIREBASE_PROJECT_ID", "chat-app"),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8081"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_APPLICATION_CREDENTIALS"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("APP_PORT", "eighty"),
            ("FIREBASE_PROJECT_ID", "chat-app"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/sa.json"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
