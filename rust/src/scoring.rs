//! Scoring strategies for task prioritization.
//!
//! Implements five strategies, higher score = do first:
//! - `smart`: urgency + importance + effort + blocking bonus
//! - `fastest`: least estimated effort first
//! - `impact`: highest importance first
//! - `deadline`: earliest due date first
//! - `eisenhower`: urgent/important quadrant classification

use chrono::{Datelike, NaiveDate, Weekday};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::models::{EisenhowerQuadrant, Task, TaskId};

/// Importance used when a task does not specify one.
pub const DEFAULT_IMPORTANCE: i32 = 5;
/// Effort used by `smart` when a task does not specify one.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;
/// Effort used by `fastest` when a task does not specify one.
pub const FASTEST_DEFAULT_HOURS: f64 = 0.0;

/// Importance at or above which `smart` reports "High Importance".
const HIGH_IMPORTANCE: i32 = 8;
const IMPORTANCE_WEIGHT: f64 = 4.0;
const QUICK_WIN_MAX_HOURS: f64 = 2.0;
const LONG_TASK_MIN_HOURS: f64 = 10.0;
const EFFORT_ADJUSTMENT: f64 = 5.0;
const WEEKEND_PENALTY: f64 = 5.0;
const BLOCKING_BONUS: f64 = 5.0;

/// Days remaining at or below which a task is urgent for the Eisenhower matrix.
const EISENHOWER_URGENT_DAYS: i64 = 3;
/// Importance at or above which a task is important for the Eisenhower matrix.
const EISENHOWER_IMPORTANT: i32 = 7;

/// Named scoring policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    #[default]
    Smart,
    Fastest,
    Impact,
    Deadline,
    Eisenhower,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Smart,
        Strategy::Fastest,
        Strategy::Impact,
        Strategy::Deadline,
        Strategy::Eisenhower,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Fastest => "fastest",
            Self::Impact => "impact",
            Self::Deadline => "deadline",
            Self::Eisenhower => "eisenhower",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Result of scoring one task.
#[derive(Clone, Debug, PartialEq)]
pub struct Score {
    pub value: f64,
    pub explanation: String,
    pub quadrant: Option<EisenhowerQuadrant>,
}

impl Score {
    fn new(value: f64, explanation: impl Into<String>) -> Self {
        Self {
            value,
            explanation: explanation.into(),
            quadrant: None,
        }
    }
}

/// Lookup structures built once per batch.
///
/// Duplicate ids collapse to the last task with that id, and only that task's
/// dependency list counts toward blocking bonuses.
pub struct TaskIndex<'a> {
    by_id: FxHashMap<&'a TaskId, &'a Task>,
    /// task id -> number of other tasks listing it as a dependency
    blocked_counts: FxHashMap<&'a TaskId, usize>,
}

impl<'a> TaskIndex<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let by_id: FxHashMap<&TaskId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();

        let mut blocked_counts: FxHashMap<&TaskId, usize> =
            FxHashMap::with_capacity_and_hasher(by_id.len(), Default::default());
        for &task in by_id.values() {
            // A dependent counts once per blocker, however often it lists it
            let mut seen: FxHashSet<&TaskId> = FxHashSet::default();
            for dep in &task.dependencies {
                if *dep != task.id && seen.insert(dep) {
                    *blocked_counts.entry(dep).or_default() += 1;
                }
            }
        }

        Self {
            by_id,
            blocked_counts,
        }
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of other tasks that depend on `id`.
    pub fn blocked_count(&self, id: &TaskId) -> usize {
        self.blocked_counts.get(id).copied().unwrap_or(0)
    }
}

/// Saturday or Sunday.
pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn days_remaining(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Urgency points and label for the `smart` strategy.
fn urgency(days: i64) -> (f64, Option<&'static str>) {
    match days {
        d if d < 0 => (100.0, Some("OVERDUE")),
        0 => (50.0, Some("Due today")),
        1..=3 => ((30 - days * 5) as f64, Some("Due soon")),
        _ => ((10 - days).max(0) as f64, None),
    }
}

/// Multi-factor score: urgency, importance, effort and how many tasks this one blocks.
pub fn score_smart(task: &Task, index: &TaskIndex<'_>, today: NaiveDate) -> Score {
    let mut value = 0.0;
    let mut reasons: Vec<String> = Vec::new();

    match task.parsed_due_date() {
        Some(due) => {
            let days = days_remaining(due, today);
            if is_weekend(due) && days > 0 {
                value -= WEEKEND_PENALTY;
                reasons.push("Weekend Due Date (Slight Penalty)".to_string());
            }
            let (points, label) = urgency(days);
            value += points;
            if let Some(label) = label {
                reasons.push(label.to_string());
            }
        }
        None => reasons.push("Invalid date".to_string()),
    }

    let importance = task.importance.unwrap_or(DEFAULT_IMPORTANCE);
    value += f64::from(importance) * IMPORTANCE_WEIGHT;
    if importance >= HIGH_IMPORTANCE {
        reasons.push("High Importance".to_string());
    }

    let hours = task.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS);
    if hours <= QUICK_WIN_MAX_HOURS {
        value += EFFORT_ADJUSTMENT;
        reasons.push("Quick Win".to_string());
    } else if hours > LONG_TASK_MIN_HOURS {
        value -= EFFORT_ADJUSTMENT;
    }

    let blocks = index.blocked_count(&task.id);
    if blocks > 0 {
        value += BLOCKING_BONUS * blocks as f64;
        reasons.push(format!("Blocks {blocks} task(s)"));
    }

    Score::new(round2(value), reasons.join(", "))
}

/// Lower effort scores higher.
pub fn score_fastest(task: &Task) -> Score {
    let hours = task.estimated_hours.unwrap_or(FASTEST_DEFAULT_HOURS);
    Score::new(0.0 - hours, format!("{hours} hours"))
}

pub fn score_impact(task: &Task) -> Score {
    let importance = task.importance.unwrap_or(DEFAULT_IMPORTANCE);
    Score::new(f64::from(importance), format!("Importance: {importance}"))
}

/// Earlier due dates score higher: the score is the negated Unix timestamp of
/// midnight UTC on the due date. Unparsable dates score 0.
pub fn score_deadline(task: &Task) -> Score {
    let raw = task.due_date.clone().unwrap_or_default();
    let timestamp = task
        .parsed_due_date()
        .and_then(|due| due.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp());

    match timestamp {
        Some(ts) => Score::new(-(ts as f64), raw),
        None => Score::new(0.0, raw),
    }
}

pub fn score_eisenhower(task: &Task, today: NaiveDate) -> Score {
    let urgent = task
        .parsed_due_date()
        .is_some_and(|due| days_remaining(due, today) <= EISENHOWER_URGENT_DAYS);
    let important = task.importance.unwrap_or(DEFAULT_IMPORTANCE) >= EISENHOWER_IMPORTANT;

    let quadrant = EisenhowerQuadrant::classify(urgent, important);
    Score {
        value: quadrant.score(),
        explanation: format!("Quadrant: {quadrant}"),
        quadrant: Some(quadrant),
    }
}

/// Score a task with the given strategy.
pub fn score_task(
    strategy: Strategy,
    task: &Task,
    index: &TaskIndex<'_>,
    today: NaiveDate,
) -> Score {
    match strategy {
        Strategy::Smart => score_smart(task, index, today),
        Strategy::Fastest => score_fastest(task),
        Strategy::Impact => score_impact(task),
        Strategy::Deadline => score_deadline(task),
        Strategy::Eisenhower => score_eisenhower(task, today),
    }
}
