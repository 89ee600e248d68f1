//! Health data provider: daily activity/vitals snapshots.
//!
//! The phone syncs its platform health data into the document store; this
//! module only reads it back. Daily snapshots live at
//! `users/{uid}/healthDaily/{YYYY-MM-DD}` and the step history at
//! `users/{uid}/steps/{YYYY}` as one field per day keyed `MMDD`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::firestore::{parse_document, parse_firestore_fields, FirestoreClient};
use crate::models::HealthMetrics;

/// Days of step history attached to a snapshot.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

#[async_trait]
pub trait HealthDataProvider: Send + Sync {
    /// Snapshot for `day`, including the step series for the seven
    /// completed days before it.
    async fn daily_metrics(&self, uid: &str, day: NaiveDate) -> Result<HealthMetrics>;
}

#[derive(Clone)]
pub struct FirestoreHealthProvider {
    firestore: FirestoreClient,
}

impl FirestoreHealthProvider {
    pub fn new(firestore: FirestoreClient) -> Self {
        Self { firestore }
    }

    async fn snapshot(&self, uid: &str, day: NaiveDate) -> Result<HealthMetrics> {
        let path = format!("users/{}/healthDaily/{}", uid, day.format("%Y-%m-%d"));
        let Some(doc) = self.firestore.get_document(&path).await? else {
            tracing::debug!(%day, "No health snapshot synced for day");
            return Ok(HealthMetrics::default());
        };

        let mut parsed = parse_document(&doc);
        if let Some(obj) = parsed.as_object_mut() {
            obj.remove("weeklySteps");
        }
        serde_json::from_value(parsed).map_err(|e| Error::MalformedRecord {
            collection: "healthDaily".to_string(),
            id: day.to_string(),
            reason: e.to_string(),
        })
    }

    async fn step_history(
        &self,
        uid: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, u64>> {
        let mut series = BTreeMap::new();

        for year in start.year()..=end.year() {
            let path = format!("users/{}/steps/{}", uid, year);
            let Some(doc) = self.firestore.get_document(&path).await? else {
                continue;
            };
            let Some(fields) = doc.fields else {
                continue;
            };

            let parsed = parse_firestore_fields(&Value::Object(fields));
            if let Some(map) = parsed.as_object() {
                series.extend(steps_in_year_doc(year, map, start, end));
            }
        }

        Ok(series)
    }
}

#[async_trait]
impl HealthDataProvider for FirestoreHealthProvider {
    async fn daily_metrics(&self, uid: &str, day: NaiveDate) -> Result<HealthMetrics> {
        let (start, end) = history_window(day);
        let (snapshot, weekly) = tokio::join!(
            self.snapshot(uid, day),
            self.step_history(uid, start, end)
        );

        let mut metrics = snapshot?;
        metrics.weekly_steps = match weekly {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(error = %e, "Step history unavailable");
                BTreeMap::new()
            }
        };
        Ok(metrics)
    }
}

/// Inclusive range of the step series for `day`: the seven days before it.
/// The count for `day` itself is still partial.
fn history_window(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    (day - Duration::days(WEEKLY_WINDOW_DAYS), day - Duration::days(1))
}

/// Pull the `MMDD`-keyed step counts of one year document that fall in
/// `[start, end]`. Entries are either a bare count or `{ "st": count }`.
fn steps_in_year_doc(
    year: i32,
    map: &serde_json::Map<String, Value>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(NaiveDate, u64)> {
    map.iter()
        .filter(|(key, _)| key.len() == 4 && key.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|(key, val)| {
            let month: u32 = key[..2].parse().ok()?;
            let day: u32 = key[2..].parse().ok()?;
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            if date < start || date > end {
                return None;
            }
            let raw = val.get("st").unwrap_or(val);
            let steps = raw
                .as_u64()
                .or_else(|| raw.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .or_else(|| raw.as_str().and_then(|s| s.parse().ok()))?;
            Some((date, steps))
        })
        .collect()
}
