//! Health insights
//!
//! A stateless rule pipeline: seven analyzers inspect the same day's
//! metrics and weekly step series, and the generator ranks what they emit.
//!
//! ## Built-in analyzers
//!
//! - **Steps** - daily goal progress and the weekly step trend
//! - **Sleep** - hours against the 7-9h healthy range
//! - **Heart rate** - resting rate against 60-100 bpm
//! - **Activity** - active calories burned
//! - **Hydration** - water against the daily goal
//! - **Correlations** - sleep/steps balance, activity vs. intake
//! - **Critical** - high-priority actions from the overall health score
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pulse_health_api::insights::InsightGenerator;
//!
//! let generator = InsightGenerator::new(goals);
//! for insight in generator.generate(&metrics, &metrics.weekly_steps) {
//!     println!("[{}] {}", insight.priority, insight.title);
//! }
//! ```

pub mod analyzers;
pub mod engine;
pub mod types;

pub use engine::{AnalysisInput, Analyzer, InsightGenerator, MAX_INSIGHTS};
pub use types::{Insight, InsightKind, Priority};
