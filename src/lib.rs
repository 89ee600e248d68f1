//! Daily progress scoring and rule-based health insights for the Pulse
//! health companion, backed by Firebase Auth and Firestore.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod firestore;
pub mod health;
pub mod insights;
pub mod models;
pub mod progress;
pub mod store;

pub use client::PulseClient;
pub use config::{Config, Goals};
pub use error::{Error, Result};
pub use insights::{Insight, InsightGenerator, InsightKind, Priority};
pub use models::HealthMetrics;
pub use progress::{Category, DailyProgress, ProgressAggregator};
