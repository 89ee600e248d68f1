//! Core types for health insights

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Direction of a metric over the week
    Trend,
    /// Something worth doing today
    Recommendation,
    /// A goal or healthy range reached
    Achievement,
    /// A value outside the healthy range
    Warning,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Trend => "trend",
            InsightKind::Recommendation => "recommendation",
            InsightKind::Achievement => "achievement",
            InsightKind::Warning => "warning",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric rank for sorting (higher = shown first)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A short observation about the user's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        priority: Priority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            priority,
        }
    }

    pub fn achievement(priority: Priority, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(InsightKind::Achievement, priority, title, message)
    }

    pub fn warning(priority: Priority, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(InsightKind::Warning, priority, title, message)
    }

    pub fn recommendation(priority: Priority, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(InsightKind::Recommendation, priority, title, message)
    }

    pub fn trend(priority: Priority, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(InsightKind::Trend, priority, title, message)
    }
}
