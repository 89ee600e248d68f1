//! Per-user document collections the progress score reads from.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::firestore::{parse_document, FirestoreClient, TimeRange};

/// Sub-collections under `users/{uid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    QuizCompletions,
    LearningSessions,
    VisualPhotos,
    Medications,
    MedicationLogs,
    ActionPlans,
    CheckIns,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::QuizCompletions => "quizCompletions",
            Collection::LearningSessions => "learningSessions",
            Collection::VisualPhotos => "visualPhotos",
            Collection::Medications => "medications",
            Collection::MedicationLogs => "medicationLogs",
            Collection::ActionPlans => "actionPlans",
            Collection::CheckIns => "checkIns",
        }
    }

    /// Timestamp field a [`TimeRange`] filters on. `None` for collections
    /// that are always read whole.
    pub fn timestamp_field(&self) -> Option<&'static str> {
        match self {
            Collection::QuizCompletions => Some("completedAt"),
            Collection::LearningSessions => Some("startedAt"),
            Collection::VisualPhotos => Some("createdAt"),
            Collection::Medications => None,
            Collection::MedicationLogs => Some("takenAt"),
            Collection::ActionPlans => Some("dueDate"),
            Collection::CheckIns => Some("createdAt"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read access to a user's documents. Records come back as flat JSON
/// objects carrying their document id under `_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(
        &self,
        uid: &str,
        collection: Collection,
        range: Option<TimeRange>,
    ) -> Result<Vec<Value>>;
}

/// [`DocumentStore`] over Firestore's REST API.
#[derive(Clone)]
pub struct FirestoreStore {
    firestore: FirestoreClient,
}

impl FirestoreStore {
    pub fn new(firestore: FirestoreClient) -> Self {
        Self { firestore }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(
        &self,
        uid: &str,
        collection: Collection,
        range: Option<TimeRange>,
    ) -> Result<Vec<Value>> {
        let filter = match (collection.timestamp_field(), range) {
            (Some(field), Some(range)) => Some((field, range)),
            _ => None,
        };

        let docs = self
            .firestore
            .query_collection(&format!("users/{}", uid), collection.as_str(), filter)
            .await?;
        Ok(docs.iter().map(parse_document).collect())
    }
}

/// Decode raw records into `T`, dropping the ones that don't fit.
pub fn decode_records<T: DeserializeOwned>(collection: Collection, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match decode_record(collection, record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

fn decode_record<T: DeserializeOwned>(collection: Collection, record: Value) -> Result<T> {
    let id = record
        .get("_id")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown>")
        .to_string();
    serde_json::from_value(record).map_err(|e| Error::MalformedRecord {
        collection: collection.to_string(),
        id,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionPlan, CheckIn};
    use serde_json::json;

    #[test]
    fn malformed_records_are_dropped() {
        let records = vec![
            json!({"_id": "a", "createdAt": "2026-10-19T09:00:00Z", "mood": "good"}),
            json!({"_id": "b", "createdAt": "yesterday-ish"}),
            json!({"_id": "c"}),
            json!({"_id": "d", "createdAt": "2026-10-19T10:30:00.123456Z"}),
        ];

        let check_ins: Vec<CheckIn> = decode_records(Collection::CheckIns, records);
        let ids: Vec<&str> = check_ins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn action_plan_defaults() {
        let records = vec![json!({
            "_id": "p1",
            "title": "Stretch",
            "dueDate": "2026-10-19T17:00:00Z"
        })];
        let plans: Vec<ActionPlan> = decode_records(Collection::ActionPlans, records);
        assert_eq!(plans.len(), 1);
        assert!(!plans[0].is_completed);
        assert!(plans[0].completed_at.is_none());
        assert!(plans[0].description.is_none());
    }

    #[test]
    fn medications_are_not_time_filtered() {
        assert_eq!(Collection::Medications.timestamp_field(), None);
        assert_eq!(Collection::ActionPlans.timestamp_field(), Some("dueDate"));
    }
}
