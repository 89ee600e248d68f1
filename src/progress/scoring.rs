//! Per-category score functions. Each is pure over its fetched inputs.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};

use crate::config::Goals;
use crate::models::{ratio, ActionPlan, HealthMetrics};

/// Bonus added to both sides of the health average when a heart rate exists.
const HEART_RATE_BONUS: f64 = 0.05;

/// One local calendar day, as a UTC half-open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The local day `now` falls in, bounded by local midnights.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let date = now.date_naive();
        let start = local_midnight(now, date);
        let end = date
            .succ_opt()
            .map(|next| local_midnight(now, next))
            .unwrap_or(start + Duration::days(1));
        Self { date, start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match now.timezone().from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST jump.
        None => midnight_at_offset_of(now, date),
    }
}

/// Midnight of `date` taken at the UTC offset `now` is currently on.
fn midnight_at_offset_of<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> DateTime<Utc> {
    let elapsed = now.time().num_seconds_from_midnight() as i64;
    let shift = (now.date_naive() - date).num_days();
    (now.with_timezone(&Utc) - Duration::seconds(elapsed) - Duration::days(shift))
        .with_nanosecond(0)
        .unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Health sub-score: mean of steps, active calories, sleep and water
/// progress, with a heart-rate bonus on numerator and denominator.
pub fn health_score(metrics: &HealthMetrics, goals: &Goals) -> f64 {
    let parts = [
        metrics.steps_progress(goals.steps),
        ratio(metrics.active_calories as f64, goals.active_calories as f64),
        ratio(metrics.sleep_hours, goals.sleep_hours),
        metrics.water_progress(goals.water_oz),
    ];

    let mut score: f64 = parts.iter().map(|p| p * 0.25).sum();
    let mut max_score = 1.0;
    if metrics.has_heart_rate() {
        score += HEART_RATE_BONUS;
        max_score += HEART_RATE_BONUS;
    }

    (score / max_score).clamp(0.0, 1.0)
}

/// Quizzes count first; time spent reading only matters with no quiz today.
pub fn learning_score(quizzes_completed: usize, learning_minutes: f64) -> f64 {
    match quizzes_completed {
        n if n >= 3 => 1.0,
        2 => 0.5,
        1 => 0.25,
        _ if learning_minutes >= 30.0 => 0.75,
        _ if learning_minutes >= 15.0 => 0.50,
        _ if learning_minutes >= 5.0 => 0.25,
        _ => 0.0,
    }
}

pub fn visual_score(photos: usize) -> f64 {
    match photos {
        0 => 0.0,
        1 => 0.5,
        _ => 1.0,
    }
}

/// Two doses per tracked medication are expected each day. Users who
/// track no medication are not penalised.
pub fn medication_score(medications: usize, doses_logged: usize) -> f64 {
    if medications == 0 {
        return 1.0;
    }

    let expected = (medications * 2) as f64;
    let actual = doses_logged as f64;
    if actual >= expected {
        1.0
    } else if actual >= expected / 2.0 {
        0.75
    } else if actual >= 1.0 {
        0.5
    } else {
        (actual / medications as f64).min(1.0)
    }
}

/// Share of today's due plans completed today. Nothing due is a full score.
pub fn action_plan_score(plans: &[ActionPlan], day: &DayWindow) -> f64 {
    let due: Vec<&ActionPlan> = plans.iter().filter(|p| day.contains(p.due_date)).collect();
    if due.is_empty() {
        return 1.0;
    }

    let completed = due
        .iter()
        .filter(|p| match p.completed_at {
            Some(at) => day.contains(at),
            None => p.is_completed,
        })
        .count();

    completed as f64 / due.len() as f64
}

pub fn check_in_score(check_ins: usize) -> f64 {
    match check_ins {
        0 => 0.0,
        1 => 0.5,
        _ => 1.0,
    }
}
