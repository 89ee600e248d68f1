//! Built-in analyzers. Each one looks at the same snapshot and may emit
//! any number of insights.

use super::engine::{AnalysisInput, Analyzer};
use super::types::{Insight, Priority};
use crate::models::ratio;
use crate::progress::scoring::health_score;

/// Ratio of recent to earlier step average that counts as a trend.
const TREND_UP: f64 = 1.15;
const TREND_DOWN: f64 = 0.85;
/// Days averaged at each end of the weekly series.
const TREND_SPAN: usize = 3;

const HEALTHY_SLEEP: std::ops::RangeInclusive<f64> = 7.0..=9.0;
const HIGH_ACTIVE_CALORIES: u32 = 600;
const LOW_ACTIVE_CALORIES: u32 = 300;
const HIGH_DIETARY_CALORIES: u32 = 1500;
const GLASS_OZ: f64 = 8.0;

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<u64>() as f64 / values.len() as f64
}

pub struct StepsAnalyzer;

impl StepsAnalyzer {
    fn daily(&self, input: &AnalysisInput<'_>) -> Option<Insight> {
        let goal = input.goals.steps;
        let progress = input.metrics.steps_progress(goal);
        let remaining = (goal as u64).saturating_sub(input.metrics.steps);

        if progress >= 1.0 {
            Some(Insight::achievement(
                Priority::Medium,
                "Step Goal Achieved",
                format!("You reached {} steps today. Keep it up!", input.metrics.steps),
            ))
        } else if progress >= 0.8 {
            Some(Insight::recommendation(
                Priority::Low,
                "Almost There",
                format!("Just {} more steps to hit your daily goal.", remaining),
            ))
        } else if progress < 0.5 {
            Some(Insight::recommendation(
                Priority::Medium,
                "Boost Your Activity",
                format!(
                    "You're at {:.0}% of your step goal. A short walk would help close the gap.",
                    progress * 100.0
                ),
            ))
        } else {
            None
        }
    }

    fn weekly_trend(&self, input: &AnalysisInput<'_>) -> Option<Insight> {
        let series: Vec<u64> = input.weekly_steps.values().copied().collect();
        if series.len() < TREND_SPAN {
            return None;
        }

        let earlier = mean(&series[..TREND_SPAN]);
        let recent = mean(&series[series.len() - TREND_SPAN..]);
        if earlier <= 0.0 {
            return None;
        }

        let change = recent / earlier;
        if change > TREND_UP {
            Some(Insight::trend(
                Priority::Medium,
                "Steps Trending Up",
                format!(
                    "Your recent daily steps are up {:.0}% compared to earlier this week.",
                    (change - 1.0) * 100.0
                ),
            ))
        } else if change < TREND_DOWN {
            Some(Insight::warning(
                Priority::Medium,
                "Steps Trending Down",
                format!(
                    "Your recent daily steps are down {:.0}% compared to earlier this week.",
                    (1.0 - change) * 100.0
                ),
            ))
        } else {
            None
        }
    }
}

impl Analyzer for StepsAnalyzer {
    fn name(&self) -> &'static str {
        "steps"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        self.daily(input)
            .into_iter()
            .chain(self.weekly_trend(input))
            .collect()
    }
}

pub struct SleepAnalyzer;

impl Analyzer for SleepAnalyzer {
    fn name(&self) -> &'static str {
        "sleep"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let hours = input.metrics.sleep_hours;
        let insight = if HEALTHY_SLEEP.contains(&hours) {
            Insight::achievement(
                Priority::Medium,
                "Well Rested",
                format!("{:.1} hours of sleep is right in the healthy range.", hours),
            )
        } else if hours < 6.0 {
            Insight::warning(
                Priority::High,
                "Not Enough Sleep",
                format!(
                    "Only {:.1} hours of sleep. Aim for 7-9 hours to support recovery.",
                    hours
                ),
            )
        } else if hours > 10.0 {
            Insight::recommendation(
                Priority::Medium,
                "Long Sleep",
                format!(
                    "{:.1} hours is more than usual. Regular oversleeping can be worth mentioning to your doctor.",
                    hours
                ),
            )
        } else {
            return Vec::new();
        };
        vec![insight]
    }
}

pub struct HeartRateAnalyzer;

impl Analyzer for HeartRateAnalyzer {
    fn name(&self) -> &'static str {
        "heart_rate"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let bpm = input.metrics.heart_rate_bpm;
        if bpm == 0 {
            return Vec::new();
        }

        let insight = if bpm < 60 {
            Insight::recommendation(
                Priority::Low,
                "Low Resting Heart Rate",
                format!(
                    "{} bpm is on the low side, often a sign of good fitness. Check in with a doctor if you feel dizzy or tired.",
                    bpm
                ),
            )
        } else if bpm <= 100 {
            Insight::achievement(
                Priority::Low,
                "Healthy Heart Rate",
                format!("{} bpm is within the normal resting range.", bpm),
            )
        } else {
            Insight::warning(
                Priority::High,
                "Elevated Heart Rate",
                format!(
                    "{} bpm is above the normal resting range. Rest, hydrate, and seek care if it persists.",
                    bpm
                ),
            )
        };
        vec![insight]
    }
}

pub struct ActivityAnalyzer;

impl Analyzer for ActivityAnalyzer {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let active = input.metrics.active_calories;
        if active >= HIGH_ACTIVE_CALORIES {
            vec![Insight::achievement(
                Priority::Medium,
                "Highly Active Day",
                format!("You burned {} active calories today.", active),
            )]
        } else if active < LOW_ACTIVE_CALORIES {
            vec![Insight::recommendation(
                Priority::Medium,
                "Move a Little More",
                format!(
                    "{} active calories so far. 20 minutes of brisk walking burns roughly 100 more.",
                    active
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

pub struct HydrationAnalyzer;

impl Analyzer for HydrationAnalyzer {
    fn name(&self) -> &'static str {
        "hydration"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let progress = input.metrics.water_progress(input.goals.water_oz);
        if progress >= 1.0 {
            vec![Insight::achievement(
                Priority::Low,
                "Hydration Goal Met",
                format!("{:.0} oz of water today. Nicely done.", input.metrics.water_ounces),
            )]
        } else if progress < 0.5 {
            vec![Insight::recommendation(
                Priority::Medium,
                "Drink More Water",
                format!(
                    "You're at {:.0} of {:.0} oz. Keep a bottle nearby.",
                    input.metrics.water_ounces, input.goals.water_oz
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Observations that need more than one metric.
pub struct CorrelationAnalyzer;

impl Analyzer for CorrelationAnalyzer {
    fn name(&self) -> &'static str {
        "correlations"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let m = input.metrics;
        let mut insights = Vec::new();

        if HEALTHY_SLEEP.contains(&m.sleep_hours) && m.steps_progress(input.goals.steps) >= 0.8 {
            insights.push(Insight::achievement(
                Priority::Medium,
                "Great Balance",
                "Good sleep and steady movement today. That combination supports energy and mood.",
            ));
        }

        if m.active_calories >= input.goals.active_calories
            && m.dietary_calories > 0
            && m.active_calories as f64 / m.dietary_calories as f64 > 0.3
        {
            insights.push(Insight::trend(
                Priority::Low,
                "Active Lifestyle",
                format!(
                    "You burned {} of the {} calories you ate through activity.",
                    m.active_calories, m.dietary_calories
                ),
            ));
        }

        insights
    }
}

/// High-priority calls to action driven by the overall health score.
/// Some deliberately repeat what other analyzers say.
pub struct CriticalAnalyzer;

impl CriticalAnalyzer {
    fn overall(&self, score: f64) -> Option<Insight> {
        if score < 50.0 {
            Some(Insight::warning(
                Priority::High,
                "Health Score Needs Attention",
                format!(
                    "Today's health score is {:.0}/100. Focus on one thing: a walk, water, or an earlier night.",
                    score
                ),
            ))
        } else if score < 70.0 {
            Some(Insight::recommendation(
                Priority::High,
                "Room to Improve",
                format!(
                    "Today's health score is {:.0}/100. A couple of small habits will push it over 70.",
                    score
                ),
            ))
        } else if score >= 80.0 {
            Some(Insight::achievement(
                Priority::High,
                "Excellent Health Score",
                format!("Today's health score is {:.0}/100.", score),
            ))
        } else {
            None
        }
    }
}

impl Analyzer for CriticalAnalyzer {
    fn name(&self) -> &'static str {
        "critical"
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight> {
        let m = input.metrics;
        let goals = input.goals;
        let score = health_score(m, goals) * 100.0;

        let steps_progress = m.steps_progress(goals.steps);
        let exercise_progress = ratio(m.active_calories as f64, goals.active_calories as f64);
        let water_progress = m.water_progress(goals.water_oz);

        let mut insights: Vec<Insight> = self.overall(score).into_iter().collect();

        if steps_progress < 0.5 && exercise_progress < 0.5 {
            insights.push(Insight::recommendation(
                Priority::High,
                "Get Moving",
                "Both steps and exercise are under half of today's goal. Try a 15 minute walk now.",
            ));
        }

        if m.sleep_hours < 6.0 {
            insights.push(Insight::warning(
                Priority::High,
                "Prioritize Sleep Tonight",
                format!(
                    "{:.1} hours last night. Plan to be in bed early enough for at least 7 hours.",
                    m.sleep_hours
                ),
            ));
        }

        if water_progress < 0.5 {
            let glasses = ((goals.water_oz - m.water_ounces) / GLASS_OZ).ceil().max(0.0) as u32;
            insights.push(Insight::recommendation(
                Priority::High,
                "Hydrate Now",
                format!(
                    "Drink {} more {} of water to reach your goal.",
                    glasses,
                    if glasses == 1 { "glass" } else { "glasses" }
                ),
            ));
        }

        if m.active_calories < LOW_ACTIVE_CALORIES && m.dietary_calories > HIGH_DIETARY_CALORIES {
            insights.push(Insight::recommendation(
                Priority::High,
                "Balance Intake and Activity",
                format!(
                    "{} calories eaten against {} burned through activity. Add some movement to balance the day.",
                    m.dietary_calories, m.active_calories
                ),
            ));
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Goals;
    use crate::insights::types::InsightKind;
    use crate::models::HealthMetrics;
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn run(analyzer: &dyn Analyzer, metrics: &HealthMetrics, weekly: &BTreeMap<NaiveDate, u64>) -> Vec<Insight> {
        let goals = Goals::default();
        analyzer.analyze(&AnalysisInput {
            metrics,
            weekly_steps: weekly,
            goals: &goals,
        })
    }

    fn titles(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.title.as_str()).collect()
    }

    fn week(counts: &[u64]) -> BTreeMap<NaiveDate, u64> {
        let start = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| (start + Duration::days(i as i64), *c))
            .collect()
    }

    #[test]
    fn step_goal_reached() {
        let metrics = HealthMetrics {
            steps: 10_000,
            ..Default::default()
        };
        let insights = run(&StepsAnalyzer, &metrics, &BTreeMap::new());
        assert_eq!(titles(&insights), vec!["Step Goal Achieved"]);
        assert_eq!(insights[0].kind, InsightKind::Achievement);
    }

    #[test]
    fn low_steps_get_boost_not_near_goal() {
        let metrics = HealthMetrics {
            steps: 4_000,
            ..Default::default()
        };
        let insights = run(&StepsAnalyzer, &metrics, &BTreeMap::new());
        let titles = titles(&insights);
        assert!(titles.contains(&"Boost Your Activity"));
        assert!(!titles.contains(&"Almost There"));
    }

    #[test]
    fn near_goal_and_middle_band() {
        let near = HealthMetrics {
            steps: 8_500,
            ..Default::default()
        };
        let insights = run(&StepsAnalyzer, &near, &BTreeMap::new());
        assert_eq!(titles(&insights), vec!["Almost There"]);
        assert!(insights[0].message.contains("1500"));

        let middle = HealthMetrics {
            steps: 6_000,
            ..Default::default()
        };
        assert!(run(&StepsAnalyzer, &middle, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn weekly_trend_up() {
        let metrics = HealthMetrics {
            steps: 6_000,
            ..Default::default()
        };
        let weekly = week(&[1000, 1000, 1000, 1500, 1500, 1500]);
        let insights = run(&StepsAnalyzer, &metrics, &weekly);
        assert_eq!(titles(&insights), vec!["Steps Trending Up"]);
        assert_eq!(insights[0].kind, InsightKind::Trend);
    }

    #[test]
    fn weekly_trend_down_and_flat() {
        let metrics = HealthMetrics {
            steps: 6_000,
            ..Default::default()
        };
        let down = run(&StepsAnalyzer, &metrics, &week(&[2000, 2000, 2000, 1000, 1000, 1000]));
        assert_eq!(down[0].kind, InsightKind::Warning);

        let flat = run(&StepsAnalyzer, &metrics, &week(&[1000, 1000, 1000, 1100, 1100, 1100]));
        assert!(flat.is_empty());

        let short = run(&StepsAnalyzer, &metrics, &week(&[1000, 5000]));
        assert!(short.is_empty());
    }

    #[test]
    fn sleep_bands() {
        let at = |hours: f64| {
            run(
                &SleepAnalyzer,
                &HealthMetrics {
                    sleep_hours: hours,
                    ..Default::default()
                },
                &BTreeMap::new(),
            )
        };

        let healthy = at(7.5);
        assert_eq!(healthy.len(), 1);
        assert_eq!(healthy[0].kind, InsightKind::Achievement);

        let short = at(5.0);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].kind, InsightKind::Warning);
        assert_eq!(short[0].priority, Priority::High);

        let long = at(11.0);
        assert_eq!(long.len(), 1);
        assert_eq!(long[0].kind, InsightKind::Recommendation);

        assert!(at(6.5).is_empty());
        assert!(at(9.5).is_empty());
    }

    #[test]
    fn heart_rate_bands() {
        let at = |bpm: u32| {
            run(
                &HeartRateAnalyzer,
                &HealthMetrics {
                    heart_rate_bpm: bpm,
                    ..Default::default()
                },
                &BTreeMap::new(),
            )
        };

        assert!(at(0).is_empty());
        let low = at(52);
        assert_eq!((low[0].kind, low[0].priority), (InsightKind::Recommendation, Priority::Low));
        let normal = at(72);
        assert_eq!((normal[0].kind, normal[0].priority), (InsightKind::Achievement, Priority::Low));
        let high = at(110);
        assert_eq!((high[0].kind, high[0].priority), (InsightKind::Warning, Priority::High));
    }

    #[test]
    fn activity_and_hydration() {
        let metrics = HealthMetrics {
            active_calories: 650,
            water_ounces: 64.0,
            ..Default::default()
        };
        assert_eq!(titles(&run(&ActivityAnalyzer, &metrics, &BTreeMap::new())), vec!["Highly Active Day"]);
        assert_eq!(titles(&run(&HydrationAnalyzer, &metrics, &BTreeMap::new())), vec!["Hydration Goal Met"]);

        let idle = HealthMetrics {
            active_calories: 120,
            water_ounces: 16.0,
            ..Default::default()
        };
        assert_eq!(titles(&run(&ActivityAnalyzer, &idle, &BTreeMap::new())), vec!["Move a Little More"]);
        assert_eq!(titles(&run(&HydrationAnalyzer, &idle, &BTreeMap::new())), vec!["Drink More Water"]);
    }

    #[test]
    fn correlations() {
        let metrics = HealthMetrics {
            sleep_hours: 8.0,
            steps: 8_000,
            active_calories: 700,
            dietary_calories: 2_000,
            ..Default::default()
        };
        let insights = run(&CorrelationAnalyzer, &metrics, &BTreeMap::new());
        assert_eq!(titles(&insights), vec!["Great Balance", "Active Lifestyle"]);

        let heavy_eating = HealthMetrics {
            active_calories: 500,
            dietary_calories: 3_000,
            ..metrics
        };
        let insights = run(&CorrelationAnalyzer, &heavy_eating, &BTreeMap::new());
        assert_eq!(titles(&insights), vec!["Great Balance"]);
    }

    #[test]
    fn critical_counts_glasses_needed() {
        let metrics = HealthMetrics {
            steps: 10_000,
            active_calories: 500,
            sleep_hours: 8.0,
            water_ounces: 20.0,
            heart_rate_bpm: 70,
            ..Default::default()
        };
        let insights = run(&CriticalAnalyzer, &metrics, &BTreeMap::new());
        let hydrate = insights.iter().find(|i| i.title == "Hydrate Now").unwrap();
        // (64 - 20) / 8 = 5.5 -> 6
        assert!(hydrate.message.contains("Drink 6 more glasses"));
        assert!(insights.iter().all(|i| i.priority == Priority::High));
    }

    #[test]
    fn critical_overall_score_bands() {
        let empty = HealthMetrics::default();
        let insights = run(&CriticalAnalyzer, &empty, &BTreeMap::new());
        assert_eq!(insights[0].title, "Health Score Needs Attention");
        assert!(titles(&insights).contains(&"Get Moving"));
        assert!(titles(&insights).contains(&"Prioritize Sleep Tonight"));

        let great = HealthMetrics {
            steps: 10_000,
            active_calories: 500,
            sleep_hours: 8.0,
            water_ounces: 64.0,
            ..Default::default()
        };
        let insights = run(&CriticalAnalyzer, &great, &BTreeMap::new());
        assert_eq!(titles(&insights), vec!["Excellent Health Score"]);
    }

    #[test]
    fn critical_balance_check() {
        let metrics = HealthMetrics {
            steps: 10_000,
            sleep_hours: 8.0,
            water_ounces: 64.0,
            active_calories: 250,
            dietary_calories: 2_200,
            ..Default::default()
        };
        let insights = run(&CriticalAnalyzer, &metrics, &BTreeMap::new());
        assert!(titles(&insights).contains(&"Balance Intake and Activity"));
        assert!(!titles(&insights).contains(&"Get Moving"));
    }
}
