//! Daily progress score
//!
//! Six life areas are scored independently on `[0, 1]` and folded into one
//! weighted daily score:
//!
//! | Category      | Weight |
//! |---------------|--------|
//! | Health        | 0.40   |
//! | Learning      | 0.15   |
//! | Visual checks | 0.10   |
//! | Medication    | 0.15   |
//! | Action plans  | 0.10   |
//! | Check-ins     | 0.10   |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pulse_health_api::progress::ProgressAggregator;
//!
//! let aggregator = ProgressAggregator::new(health, store, goals);
//! let progress = aggregator.compute_daily_progress(&uid, chrono::Local::now()).await?;
//! println!("{:.0}%", progress.score * 100.0);
//! ```

pub mod aggregator;
pub mod scoring;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use aggregator::{CategoryScore, DailyProgress, ProgressAggregator};
pub use scoring::DayWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Health,
    Learning,
    Visual,
    Medication,
    ActionPlans,
    CheckIns,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Health,
        Category::Learning,
        Category::Visual,
        Category::Medication,
        Category::ActionPlans,
        Category::CheckIns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Learning => "learning",
            Category::Visual => "visual",
            Category::Medication => "medication",
            Category::ActionPlans => "action_plans",
            Category::CheckIns => "check_ins",
        }
    }

    /// Share of the daily score. The weights of [`Category::ALL`] sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Health => 0.40,
            Category::Learning => 0.15,
            Category::Visual => 0.10,
            Category::Medication => 0.15,
            Category::ActionPlans => 0.10,
            Category::CheckIns => 0.10,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `Σ score × weight`, clamped to `[0, 1]`.
pub fn weighted_score<'a>(scores: impl IntoIterator<Item = &'a CategoryScore>) -> f64 {
    scores
        .into_iter()
        .map(|s| s.score * s.category.weight())
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = Category::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_score_stays_in_unit_range() {
        let steps = [0.0, 0.25, 0.5, 0.75, 1.0];
        for &a in &steps {
            for &b in &steps {
                let scores: Vec<CategoryScore> = Category::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, &category)| CategoryScore::ok(category, if i % 2 == 0 { a } else { b }))
                    .collect();
                let total = weighted_score(&scores);
                assert!((0.0..=1.0).contains(&total), "{} out of range", total);
            }
        }

        let all_perfect: Vec<CategoryScore> =
            Category::ALL.iter().map(|&c| CategoryScore::ok(c, 1.0)).collect();
        assert!((weighted_score(&all_perfect) - 1.0).abs() < 1e-9);
    }
}
