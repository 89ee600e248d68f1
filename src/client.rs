use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use tokio::sync::Mutex;

use crate::auth::FirebaseAuth;
use crate::config::{Config, Goals};
use crate::error::{Error, Result};
use crate::firestore::{parse_document, FirestoreClient};
use crate::health::{FirestoreHealthProvider, HealthDataProvider};
use crate::insights::{Insight, InsightGenerator};
use crate::models::{HealthMetrics, UserProfile};
use crate::progress::{DailyProgress, ProgressAggregator};
use crate::store::FirestoreStore;

/// Signed-in access to one user's progress score and insights.
///
/// Cheap to clone; clones share the token cache and the published score.
#[derive(Clone)]
pub struct PulseClient {
    pub auth: FirebaseAuth,
    pub firestore: FirestoreClient,
    config: Config,
    user_id: Arc<Mutex<Option<String>>>,
    health: Arc<FirestoreHealthProvider>,
    aggregator: Arc<ProgressAggregator>,
}

impl PulseClient {
    pub fn new(config: Config, refresh_token: impl Into<String>) -> Self {
        let auth = FirebaseAuth::new(config.web_api_key.clone(), refresh_token);
        Self::with_auth(config, auth)
    }

    /// Sign in with email and password.
    pub async fn login(config: Config, email: &str, password: &str) -> Result<Self> {
        let auth =
            FirebaseAuth::sign_in_with_email(config.web_api_key.clone(), email, password).await?;
        Ok(Self::with_auth(config, auth))
    }

    fn with_auth(config: Config, auth: FirebaseAuth) -> Self {
        let firestore = FirestoreClient::new(auth.clone(), config.project_id.clone());
        let health = Arc::new(FirestoreHealthProvider::new(firestore.clone()));
        let store = Arc::new(FirestoreStore::new(firestore.clone()));
        let aggregator = Arc::new(ProgressAggregator::new(
            health.clone(),
            store,
            config.goals,
        ));

        Self {
            auth,
            firestore,
            config,
            user_id: Arc::new(Mutex::new(None)),
            health,
            aggregator,
        }
    }

    pub async fn get_user_id(&self) -> Result<String> {
        let mut cached = self.user_id.lock().await;
        if let Some(uid) = cached.as_ref() {
            return Ok(uid.clone());
        }
        let uid = self.auth.get_user_id().await?;
        *cached = Some(uid.clone());
        Ok(uid)
    }

    /// The user document, or an empty profile if none was saved yet.
    pub async fn get_profile(&self) -> Result<UserProfile> {
        let uid = self.get_user_id().await?;
        let Some(doc) = self.firestore.get_document(&format!("users/{}", uid)).await? else {
            return Ok(UserProfile {
                id: uid,
                ..Default::default()
            });
        };

        serde_json::from_value(parse_document(&doc)).map_err(|e| Error::MalformedRecord {
            collection: "users".to_string(),
            id: uid,
            reason: e.to_string(),
        })
    }

    /// Configured goals with the user's saved overrides applied. A profile
    /// that can't be read leaves the configured goals in place.
    pub async fn goals(&self) -> Result<Goals> {
        match self.get_profile().await {
            Ok(profile) => Ok(self.config.goals.with_profile(&profile)),
            Err(e @ Error::NotAuthenticated(_)) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Profile unavailable, using configured goals");
                Ok(self.config.goals)
            }
        }
    }

    /// Score today (local time) and publish it.
    pub async fn daily_progress(&self) -> Result<DailyProgress> {
        self.daily_progress_at(Local::now()).await
    }

    pub async fn daily_progress_at(&self, now: DateTime<Local>) -> Result<DailyProgress> {
        let uid = self.get_user_id().await?;
        self.aggregator.set_goals(self.goals().await?).await;
        self.aggregator.compute_daily_progress(&uid, now).await
    }

    /// The most recently published score.
    pub async fn latest_progress(&self) -> Option<DailyProgress> {
        self.aggregator.latest().await
    }

    /// Health snapshot for `day`. Body measurements missing from the
    /// snapshot fall back to the profile.
    pub async fn health_metrics(&self, day: NaiveDate) -> Result<HealthMetrics> {
        let uid = self.get_user_id().await?;
        let mut metrics = self.health.daily_metrics(&uid, day).await?;

        if metrics.weight_lbs <= 0.0 || metrics.height_inches <= 0.0 {
            let profile = self.get_profile().await?;
            if metrics.weight_lbs <= 0.0 {
                metrics.weight_lbs = profile.weight_lbs.unwrap_or_default();
            }
            if metrics.height_inches <= 0.0 {
                metrics.height_inches = profile.height_inches.unwrap_or_default();
            }
        }

        Ok(metrics)
    }

    /// Ranked insights for `day`.
    pub async fn insights(&self, day: NaiveDate) -> Result<Vec<Insight>> {
        let goals = self.goals().await?;
        let metrics = self.health_metrics(day).await?;
        let generator = InsightGenerator::new(goals);
        Ok(generator.generate(&metrics, &metrics.weekly_steps))
    }
}
