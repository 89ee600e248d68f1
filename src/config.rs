use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::UserProfile;

pub const DEFAULT_STEPS_GOAL: u32 = 10_000;
pub const DEFAULT_WATER_GOAL_OZ: f64 = 64.0;
pub const ACTIVE_CALORIES_GOAL: u32 = 500;
pub const SLEEP_GOAL_HOURS: f64 = 8.0;

/// Daily targets the health score and insights measure against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub steps: u32,
    pub water_oz: f64,
    pub active_calories: u32,
    pub sleep_hours: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS_GOAL,
            water_oz: DEFAULT_WATER_GOAL_OZ,
            active_calories: ACTIVE_CALORIES_GOAL,
            sleep_hours: SLEEP_GOAL_HOURS,
        }
    }
}

impl Goals {
    /// Overlay the step and water goals a user saved on their profile.
    /// Missing or non-positive values keep the current goal.
    pub fn with_profile(mut self, profile: &UserProfile) -> Self {
        if let Some(steps) = profile.steps_goal.filter(|s| *s > 0) {
            self.steps = steps;
        }
        if let Some(water) = profile.water_goal_oz.filter(|w| *w > 0.0) {
            self.water_oz = water;
        }
        self
    }
}

/// Runtime configuration for the Firebase-backed services.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub web_api_key: String,
    pub goals: Goals,
}

impl Config {
    pub fn new(project_id: impl Into<String>, web_api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            web_api_key: web_api_key.into(),
            goals: Goals::default(),
        }
    }

    /// Load configuration from `PULSE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Goals must be positive and
    /// finite.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let project_id = required(&lookup, "PULSE_FIREBASE_PROJECT_ID")?;
        let web_api_key = required(&lookup, "PULSE_FIREBASE_API_KEY")?;

        let mut goals = Goals::default();
        if let Some(steps) = optional_parsed::<u32>(&lookup, "PULSE_STEPS_GOAL")? {
            if steps == 0 {
                return Err(Error::Config("PULSE_STEPS_GOAL must be positive".to_string()));
            }
            goals.steps = steps;
        }
        if let Some(water) = optional_parsed::<f64>(&lookup, "PULSE_WATER_GOAL_OZ")? {
            if !water.is_finite() || water <= 0.0 {
                return Err(Error::Config(format!(
                    "PULSE_WATER_GOAL_OZ must be a positive number of ounces, got {}",
                    water
                )));
            }
            goals.water_oz = water;
        }

        Ok(Self {
            project_id,
            web_api_key,
            goals,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{} is not set", key)))
}

fn optional_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_goals_override_defaults() {
        let profile = UserProfile {
            steps_goal: Some(8_000),
            water_goal_oz: Some(80.0),
            ..Default::default()
        };
        let goals = Goals::default().with_profile(&profile);
        assert_eq!(goals.steps, 8_000);
        assert_eq!(goals.water_oz, 80.0);
        assert_eq!(goals.active_calories, ACTIVE_CALORIES_GOAL);
    }

    #[test]
    fn non_positive_profile_goals_are_ignored() {
        let profile = UserProfile {
            steps_goal: Some(0),
            water_goal_oz: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(Goals::default().with_profile(&profile), Goals::default());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn with_goal(key: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        lookup(&[
            ("PULSE_FIREBASE_PROJECT_ID", "pulse-dev"),
            ("PULSE_FIREBASE_API_KEY", "key"),
            (key, value),
        ])
    }

    #[test]
    fn env_goals_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("PULSE_FIREBASE_PROJECT_ID", "pulse-dev"),
            ("PULSE_FIREBASE_API_KEY", "key"),
            ("PULSE_STEPS_GOAL", " 8000 "),
            ("PULSE_WATER_GOAL_OZ", "80.5"),
        ]))
        .unwrap();
        assert_eq!(config.project_id, "pulse-dev");
        assert_eq!(config.goals.steps, 8_000);
        assert_eq!(config.goals.water_oz, 80.5);
    }

    #[test]
    fn missing_project_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[("PULSE_FIREBASE_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_positive_or_non_finite_env_goals_are_rejected() {
        for water in ["NaN", "inf", "-inf", "-5", "0"] {
            let err = Config::from_lookup(with_goal("PULSE_WATER_GOAL_OZ", water)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{} accepted", water);
        }
        for steps in ["0", "-1", "lots"] {
            let err = Config::from_lookup(with_goal("PULSE_STEPS_GOAL", steps)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{} accepted", steps);
        }
    }
}
