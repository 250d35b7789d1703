pub mod config;
pub mod error;
pub mod firestore;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod trigger;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::*;
pub use trigger::{DocumentCreatedEvent, TriggerPattern, MESSAGE_CREATED_PATTERN};
