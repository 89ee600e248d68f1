use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A day's health snapshot from the health data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthMetrics {
    pub steps: u64,
    pub heart_rate_bpm: u32,
    pub sleep_hours: f64,
    pub active_calories: u32,
    pub dietary_calories: u32,
    pub water_ounces: f64,
    pub weight_lbs: f64,
    pub height_inches: f64,
    /// Daily step counts, oldest first
    pub weekly_steps: BTreeMap<NaiveDate, u64>,
}

impl HealthMetrics {
    /// Body mass index from imperial units. Needs both weight and height.
    pub fn bmi(&self) -> Option<f64> {
        if self.weight_lbs > 0.0 && self.height_inches > 0.0 {
            Some(703.0 * self.weight_lbs / (self.height_inches * self.height_inches))
        } else {
            None
        }
    }

    pub fn steps_progress(&self, goal: u32) -> f64 {
        ratio(self.steps as f64, goal as f64)
    }

    pub fn water_progress(&self, goal_oz: f64) -> f64 {
        ratio(self.water_ounces, goal_oz)
    }

    pub fn has_heart_rate(&self) -> bool {
        self.heart_rate_bpm > 0
    }
}

/// `value / goal` capped at 1.0. A non-positive goal counts as met.
pub fn ratio(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 1.0;
    }
    let r = value / goal;
    if r.is_nan() {
        return 0.0;
    }
    r.clamp(0.0, 1.0)
}

/// User profile from the top-level user document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub height_inches: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub steps_goal: Option<u32>,
    pub water_goal_oz: Option<f64>,
}

/// A finished quiz in the learning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCompletion {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Time spent reading learning content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSession {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: f64,
}

/// A photo check-in (meal, skin, posture...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualPhoto {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// A medication the user tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
}

/// One logged dose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub taken_at: DateTime<Utc>,
    #[serde(default)]
    pub medication_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A daily mood/energy check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub mood: Option<String>,
}
