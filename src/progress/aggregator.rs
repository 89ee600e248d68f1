//! Fan-out/fan-in aggregation of the six category scores.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::scoring::{self, DayWindow};
use super::{weighted_score, Category};
use crate::config::Goals;
use crate::error::{Error, Result};
use crate::firestore::TimeRange;
use crate::health::HealthDataProvider;
use crate::models::{
    ActionPlan, CheckIn, LearningSession, Medication, MedicationLog, QuizCompletion, VisualPhoto,
};
use crate::store::{decode_records, Collection, DocumentStore};

/// One category's contribution to the daily score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    /// False when the fetch failed and the score was substituted with 0.
    pub fetched: bool,
}

impl CategoryScore {
    pub fn ok(category: Category, score: f64) -> Self {
        Self {
            category,
            score: score.clamp(0.0, 1.0),
            fetched: true,
        }
    }

    pub fn failed(category: Category) -> Self {
        Self {
            category,
            score: 0.0,
            fetched: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Weighted score in `[0, 1]`
    pub score: f64,
    pub breakdown: Vec<CategoryScore>,
    /// Run number; later runs supersede earlier ones.
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    /// Whether this run became the published value.
    pub published: bool,
}

impl DailyProgress {
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.breakdown.iter().find(|s| s.category == category)
    }
}

/// Computes and publishes the daily progress score.
///
/// Runs may overlap. Only the most recently started run publishes; an older
/// run finishing late is returned to its caller but never overwrites the
/// published value.
pub struct ProgressAggregator {
    health: Arc<dyn HealthDataProvider>,
    store: Arc<dyn DocumentStore>,
    goals: RwLock<Goals>,
    generation: AtomicU64,
    published: Mutex<Option<DailyProgress>>,
}

impl ProgressAggregator {
    pub fn new(
        health: Arc<dyn HealthDataProvider>,
        store: Arc<dyn DocumentStore>,
        goals: Goals,
    ) -> Self {
        Self {
            health,
            store,
            goals: RwLock::new(goals),
            generation: AtomicU64::new(0),
            published: Mutex::new(None),
        }
    }

    pub async fn goals(&self) -> Goals {
        *self.goals.read().await
    }

    /// Goals used by runs started after this call.
    pub async fn set_goals(&self, goals: Goals) {
        *self.goals.write().await = goals;
    }

    /// The last published score, if any run has published yet.
    pub async fn latest(&self) -> Option<DailyProgress> {
        self.published.lock().await.clone()
    }

    /// Score the local day containing `now` for `uid`.
    ///
    /// Fails only with [`Error::NotAuthenticated`] (blank `uid`), before any
    /// fetch and without touching the published value. A failed category
    /// read scores 0 for that category.
    ///
    /// The run takes its generation before the first await. If the newest
    /// run's future is dropped unfinished, its generation stays taken: older
    /// runs still in flight will not publish, and [`latest`](Self::latest)
    /// keeps the previous value until another run completes.
    pub async fn compute_daily_progress<Tz: TimeZone>(
        &self,
        uid: &str,
        now: DateTime<Tz>,
    ) -> Result<DailyProgress> {
        if uid.trim().is_empty() {
            return Err(Error::NotAuthenticated("no user id for progress".to_string()));
        }

        let day = DayWindow::containing(&now);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let goals = self.goals().await;

        let (health, learning, visual, medication, action_plans, check_ins) = tokio::join!(
            self.health_category(uid, &day, &goals),
            self.learning_category(uid, &day),
            self.visual_category(uid, &day),
            self.medication_category(uid, &day),
            self.action_plan_category(uid, &day),
            self.check_in_category(uid, &day),
        );

        let breakdown: Vec<CategoryScore> = [
            (Category::Health, health),
            (Category::Learning, learning),
            (Category::Visual, visual),
            (Category::Medication, medication),
            (Category::ActionPlans, action_plans),
            (Category::CheckIns, check_ins),
        ]
        .into_iter()
        .map(|(category, result)| settle(category, result))
        .collect();

        let mut progress = DailyProgress {
            score: weighted_score(&breakdown),
            breakdown,
            generation,
            computed_at: Utc::now(),
            published: false,
        };

        self.publish(&mut progress).await;
        Ok(progress)
    }

    async fn publish(&self, progress: &mut DailyProgress) {
        let mut published = self.published.lock().await;
        let newest = self.generation.load(Ordering::SeqCst);
        let older_than_published = published
            .as_ref()
            .is_some_and(|p| p.generation > progress.generation);

        if progress.generation != newest || older_than_published {
            tracing::debug!(
                generation = progress.generation,
                newest,
                "Discarding superseded progress run"
            );
            return;
        }

        progress.published = true;
        *published = Some(progress.clone());
        tracing::info!(
            generation = progress.generation,
            score = progress.score,
            "Published daily progress"
        );
    }

    async fn list(
        &self,
        uid: &str,
        collection: Collection,
        range: Option<TimeRange>,
    ) -> Result<Vec<serde_json::Value>> {
        self.store.list(uid, collection, range).await
    }

    async fn health_category(&self, uid: &str, day: &DayWindow, goals: &Goals) -> Result<f64> {
        let metrics = self
            .health
            .daily_metrics(uid, day.date)
            .await
            .map_err(|e| Error::fetch_failed(Category::Health, e))?;
        Ok(scoring::health_score(&metrics, goals))
    }

    async fn learning_category(&self, uid: &str, day: &DayWindow) -> Result<f64> {
        let since = Some(TimeRange::since(day.start));
        let quizzes = self
            .list(uid, Collection::QuizCompletions, since)
            .await
            .map_err(|e| Error::fetch_failed(Category::Learning, e))?;
        let quizzes: Vec<QuizCompletion> = decode_records(Collection::QuizCompletions, quizzes);

        // Reading time only matters when no quiz was finished.
        let minutes: f64 = if quizzes.is_empty() {
            let sessions = self
                .list(uid, Collection::LearningSessions, since)
                .await
                .map_err(|e| Error::fetch_failed(Category::Learning, e))?;
            decode_records::<LearningSession>(Collection::LearningSessions, sessions)
                .iter()
                .map(|s| s.duration_minutes.max(0.0))
                .sum()
        } else {
            0.0
        };

        Ok(scoring::learning_score(quizzes.len(), minutes))
    }

    async fn visual_category(&self, uid: &str, day: &DayWindow) -> Result<f64> {
        let photos = self
            .list(uid, Collection::VisualPhotos, Some(TimeRange::since(day.start)))
            .await
            .map_err(|e| Error::fetch_failed(Category::Visual, e))?;
        let photos: Vec<VisualPhoto> = decode_records(Collection::VisualPhotos, photos);
        Ok(scoring::visual_score(photos.len()))
    }

    async fn medication_category(&self, uid: &str, day: &DayWindow) -> Result<f64> {
        let (medications, logs) = tokio::join!(
            self.list(uid, Collection::Medications, None),
            self.list(uid, Collection::MedicationLogs, Some(TimeRange::since(day.start))),
        );
        let medications: Vec<Medication> = decode_records(
            Collection::Medications,
            medications.map_err(|e| Error::fetch_failed(Category::Medication, e))?,
        );
        if medications.is_empty() {
            return Ok(scoring::medication_score(0, 0));
        }

        let logs: Vec<MedicationLog> = decode_records(
            Collection::MedicationLogs,
            logs.map_err(|e| Error::fetch_failed(Category::Medication, e))?,
        );
        Ok(scoring::medication_score(medications.len(), logs.len()))
    }

    async fn action_plan_category(&self, uid: &str, day: &DayWindow) -> Result<f64> {
        let plans = self
            .list(
                uid,
                Collection::ActionPlans,
                Some(TimeRange::between(day.start, day.end)),
            )
            .await
            .map_err(|e| Error::fetch_failed(Category::ActionPlans, e))?;
        let plans: Vec<ActionPlan> = decode_records(Collection::ActionPlans, plans);
        Ok(scoring::action_plan_score(&plans, day))
    }

    async fn check_in_category(&self, uid: &str, day: &DayWindow) -> Result<f64> {
        let check_ins = self
            .list(uid, Collection::CheckIns, Some(TimeRange::since(day.start)))
            .await
            .map_err(|e| Error::fetch_failed(Category::CheckIns, e))?;
        let check_ins: Vec<CheckIn> = decode_records(Collection::CheckIns, check_ins);
        Ok(scoring::check_in_score(check_ins.len()))
    }
}

/// Fail-soft: a category whose read failed scores 0.
fn settle(category: Category, result: Result<f64>) -> CategoryScore {
    match result {
        Ok(score) => {
            tracing::debug!(category = category.as_str(), score, "Category scored");
            CategoryScore::ok(category, score)
        }
        Err(e) => {
            tracing::warn!(
                category = category.as_str(),
                error = %e,
                "Category fetch failed, scoring 0"
            );
            CategoryScore::failed(category)
        }
    }
}
