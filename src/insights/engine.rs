//! Insight generator - runs every analyzer and ranks the results

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::analyzers::{
    ActivityAnalyzer, CorrelationAnalyzer, CriticalAnalyzer, HeartRateAnalyzer, HydrationAnalyzer,
    SleepAnalyzer, StepsAnalyzer,
};
use super::types::Insight;
use crate::config::Goals;
use crate::models::HealthMetrics;

/// Most insights shown at once.
pub const MAX_INSIGHTS: usize = 6;

/// Snapshot every analyzer sees
pub struct AnalysisInput<'a> {
    pub metrics: &'a HealthMetrics,
    /// Daily step counts, oldest first
    pub weekly_steps: &'a BTreeMap<NaiveDate, u64>,
    pub goals: &'a Goals,
}

/// A rule set over one snapshot. Implementations must be pure.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze(&self, input: &AnalysisInput<'_>) -> Vec<Insight>;
}

pub struct InsightGenerator {
    analyzers: Vec<Box<dyn Analyzer>>,
    goals: Goals,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(Goals::default())
    }
}

impl InsightGenerator {
    /// Generator with the built-in analyzers, in emission order.
    pub fn new(goals: Goals) -> Self {
        Self::with_analyzers(
            goals,
            vec![
                Box::new(StepsAnalyzer),
                Box::new(SleepAnalyzer),
                Box::new(HeartRateAnalyzer),
                Box::new(ActivityAnalyzer),
                Box::new(HydrationAnalyzer),
                Box::new(CorrelationAnalyzer),
                Box::new(CriticalAnalyzer),
            ],
        )
    }

    pub fn with_analyzers(goals: Goals, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers, goals }
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    /// Run all analyzers, rank by priority (stable within a priority) and
    /// keep the top [`MAX_INSIGHTS`]. Overlapping themes are not merged.
    pub fn generate(
        &self,
        metrics: &HealthMetrics,
        weekly_steps: &BTreeMap<NaiveDate, u64>,
    ) -> Vec<Insight> {
        let input = AnalysisInput {
            metrics,
            weekly_steps,
            goals: &self.goals,
        };

        let mut insights = Vec::new();
        for analyzer in &self.analyzers {
            let found = analyzer.analyze(&input);
            tracing::debug!(analyzer = analyzer.name(), count = found.len(), "Analyzer complete");
            insights.extend(found);
        }

        // sort_by is stable: equal priorities keep emission order
        insights.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
        insights.truncate(MAX_INSIGHTS);
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::{InsightKind, Priority};

    struct Fixed(Vec<Insight>);

    impl Analyzer for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn analyze(&self, _input: &AnalysisInput<'_>) -> Vec<Insight> {
            self.0.clone()
        }
    }

    fn insight(title: &str, priority: Priority) -> Insight {
        Insight::new(InsightKind::Trend, priority, title, "")
    }

    #[test]
    fn registers_seven_analyzers() {
        let generator = InsightGenerator::default();
        assert_eq!(
            generator.analyzer_names(),
            vec!["steps", "sleep", "heart_rate", "activity", "hydration", "correlations", "critical"]
        );
    }

    #[test]
    fn sorts_by_priority_keeping_emission_order() {
        let generator = InsightGenerator::with_analyzers(
            Goals::default(),
            vec![
                Box::new(Fixed(vec![insight("a", Priority::Low), insight("b", Priority::High)])),
                Box::new(Fixed(vec![insight("c", Priority::Medium), insight("d", Priority::High)])),
            ],
        );
        let titles: Vec<String> = generator
            .generate(&HealthMetrics::default(), &BTreeMap::new())
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn never_more_than_six() {
        let many: Vec<Insight> = (0..20).map(|i| insight(&i.to_string(), Priority::Low)).collect();
        let generator = InsightGenerator::with_analyzers(Goals::default(), vec![Box::new(Fixed(many))]);
        let insights = generator.generate(&HealthMetrics::default(), &BTreeMap::new());
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(insights[0].title, "0");
        assert_eq!(insights[5].title, "5");
    }

    #[test]
    fn poor_day_is_capped_and_ranked() {
        let metrics = HealthMetrics {
            steps: 1_200,
            sleep_hours: 4.5,
            heart_rate_bpm: 112,
            active_calories: 80,
            dietary_calories: 2_400,
            water_ounces: 10.0,
            ..Default::default()
        };
        let insights = InsightGenerator::default().generate(&metrics, &BTreeMap::new());

        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert!(insights.iter().all(|i| i.priority == Priority::High));
        // sleep shortfall reported by both the sleep and critical analyzers
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert!(titles.contains(&"Not Enough Sleep"));
        assert!(titles.contains(&"Prioritize Sleep Tonight"));
    }

    #[test]
    fn healthy_day_mixes_priorities() {
        let metrics = HealthMetrics {
            steps: 11_000,
            sleep_hours: 8.0,
            heart_rate_bpm: 64,
            active_calories: 620,
            dietary_calories: 1_900,
            water_ounces: 70.0,
            ..Default::default()
        };
        let insights = InsightGenerator::default().generate(&metrics, &BTreeMap::new());

        assert!(insights.len() <= MAX_INSIGHTS);
        assert_eq!(insights[0].title, "Excellent Health Score");
        assert!(insights.iter().all(|i| i.kind != InsightKind::Warning));
        let ranks: Vec<u8> = insights.iter().map(|i| i.priority.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
    }
}
