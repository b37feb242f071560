//! Task ranking: cycle flagging, strategy scoring and the final ordering.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::cycles::{CycleDetector, CyclePolicy};
use crate::models::{AnnotatedTask, Suggestions, Task};
use crate::scoring::{score_task, Score, Strategy, TaskIndex};
use crate::{log_debug, log_decisions, log_summary};

/// Score given to tasks caught in a dependency cycle.
pub const CIRCULAR_SCORE: f64 = -1.0;
pub const CIRCULAR_EXPLANATION: &str = "Circular Dependency Detected!";

pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;
pub const SUGGESTION_MESSAGE: &str = "Here are your top priorities for today.";

/// Typed options for a ranking run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub cycle_policy: CyclePolicy,
    pub verbosity: u8,
}

impl AnnotatedTask {
    fn circular(task: Task) -> Self {
        Self {
            task,
            priority_score: CIRCULAR_SCORE,
            explanation: CIRCULAR_EXPLANATION.to_string(),
            is_circular: true,
            eisenhower_quadrant: None,
        }
    }

    fn scored(task: Task, score: Score) -> Self {
        Self {
            task,
            priority_score: score.value,
            explanation: score.explanation,
            is_circular: false,
            eisenhower_quadrant: score.quadrant,
        }
    }
}

/// Descending by score. NaN compares equal so it keeps its input position.
fn cmp_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Rank a batch of tasks.
///
/// Returns one annotated copy per input task, highest score first. Tasks with
/// equal scores keep their input order. Tasks flagged as circular get
/// [`CIRCULAR_SCORE`] and are not scored by the strategy.
pub fn sort_tasks(
    tasks: &[Task],
    strategy: Strategy,
    today: NaiveDate,
    options: &SortOptions,
) -> Vec<AnnotatedTask> {
    let verbosity = options.verbosity;
    let index = TaskIndex::new(tasks);
    let circular = CycleDetector::new(options.cycle_policy)
        .with_verbosity(verbosity)
        .detect(tasks);

    log_summary!(
        verbosity,
        "Ranking {} tasks with strategy {} as of {} ({} circular)",
        tasks.len(),
        strategy,
        today,
        circular.len()
    );

    let mut annotated: Vec<AnnotatedTask> = tasks
        .iter()
        .map(|task| {
            for dep in task.dependencies.iter().filter(|d| !index.contains(d)) {
                log_debug!(verbosity, "Task {} depends on unknown task {}", task.id, dep);
            }

            if circular.contains(&task.id) {
                log_decisions!(verbosity, "Task {}: circular dependency", task.id);
                return AnnotatedTask::circular(task.clone());
            }

            let score = score_task(strategy, task, &index, today);
            log_decisions!(
                verbosity,
                "Task {}: score={} ({})",
                task.id,
                score.value,
                score.explanation
            );
            AnnotatedTask::scored(task.clone(), score)
        })
        .collect();

    // sort_by is stable
    annotated.sort_by(|a, b| cmp_score_desc(a.priority_score, b.priority_score));
    annotated
}

/// Pick up to `limit` tasks to work on today, using the `smart` ranking.
///
/// Only tasks with a positive score are suggested, so circular tasks never are.
pub fn suggest_tasks(
    tasks: &[Task],
    today: NaiveDate,
    options: &SortOptions,
    limit: usize,
) -> Suggestions {
    let suggestions: Vec<AnnotatedTask> = sort_tasks(tasks, Strategy::Smart, today, options)
        .into_iter()
        .filter(|t| t.priority_score > 0.0)
        .take(limit)
        .collect();

    log_summary!(
        options.verbosity,
        "Suggesting {} of {} tasks",
        suggestions.len(),
        tasks.len()
    );

    Suggestions {
        suggestions,
        message: SUGGESTION_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EisenhowerQuadrant, TaskId};

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Thursday.
    fn today() -> NaiveDate {
        make_date(2025, 11, 27)
    }

    fn make_task(id: i64, due_date: &str, hours: f64, importance: i32, deps: &[i64]) -> Task {
        Task {
            id: TaskId::Int(id),
            title: format!("Task {id}"),
            due_date: Some(due_date.to_string()),
            estimated_hours: Some(hours),
            importance: Some(importance),
            dependencies: deps.iter().map(|&d| TaskId::Int(d)).collect(),
        }
    }

    fn ids(result: &[AnnotatedTask]) -> Vec<TaskId> {
        result.iter().map(|t| t.task.id.clone()).collect()
    }

    fn find(result: &[AnnotatedTask], id: i64) -> &AnnotatedTask {
        result
            .iter()
            .find(|t| t.task.id == TaskId::Int(id))
            .unwrap()
    }

    fn rank(tasks: &[Task], strategy: Strategy) -> Vec<AnnotatedTask> {
        sort_tasks(tasks, strategy, today(), &SortOptions::default())
    }

    #[test]
    fn test_smart_orders_by_score() {
        let tasks = vec![
            make_task(3, "2099-01-01", 5.0, 10, &[]),
            make_task(1, "2025-11-20", 2.0, 5, &[]),
            make_task(2, "2025-11-27", 1.0, 8, &[]),
        ];
        let result = rank(&tasks, Strategy::Smart);

        assert_eq!(ids(&result), vec![TaskId::Int(1), TaskId::Int(2), TaskId::Int(3)]);
        assert!(result[0].priority_score > 100.0);
        assert!(result[0].explanation.contains("OVERDUE"));
        assert!(result.iter().all(|t| !t.is_circular));
        assert!(result.iter().all(|t| t.eisenhower_quadrant.is_none()));
    }

    #[test]
    fn test_input_is_preserved() {
        let tasks = vec![
            make_task(1, "not a date", 3.0, 5, &[2, 77]),
            make_task(2, "2025-12-01", 1.0, 9, &[]),
        ];
        let before = tasks.clone();
        let result = rank(&tasks, Strategy::Smart);

        assert_eq!(tasks, before);
        assert_eq!(result.len(), tasks.len());
        assert_eq!(find(&result, 1).task, tasks[0]);
        assert_eq!(find(&result, 2).task, tasks[1]);
    }

    #[test]
    fn test_blocker_gets_boost() {
        let tasks = vec![
            make_task(10, "2025-12-01", 1.0, 9, &[11]),
            make_task(11, "2026-01-01", 1.0, 1, &[]),
        ];
        let result = rank(&tasks, Strategy::Smart);
        let blocker = find(&result, 11);

        assert!(blocker.explanation.contains("Blocks 1 task(s)"));
        // 4 importance + 5 quick win + 5 blocking
        assert_eq!(blocker.priority_score, 14.0);
    }

    #[test]
    fn test_three_cycle_is_fully_flagged() {
        let tasks = vec![
            make_task(1, "2025-01-01", 1.0, 5, &[2]),
            make_task(2, "2025-01-01", 1.0, 5, &[3]),
            make_task(3, "2025-01-01", 1.0, 5, &[1]),
        ];
        let result = rank(&tasks, Strategy::Smart);

        for task in &result {
            assert_eq!(task.priority_score, -1.0);
            assert_eq!(task.explanation, "Circular Dependency Detected!");
            assert!(task.is_circular);
        }
        // all tied at -1, so input order is kept
        assert_eq!(ids(&result), vec![TaskId::Int(1), TaskId::Int(2), TaskId::Int(3)]);
    }

    #[test]
    fn test_closing_edge_policy_flags_one_task() {
        let tasks = vec![
            make_task(1, "2025-01-01", 1.0, 5, &[2]),
            make_task(2, "2025-01-01", 1.0, 5, &[3]),
            make_task(3, "2025-01-01", 1.0, 5, &[1]),
        ];
        let options = SortOptions {
            cycle_policy: CyclePolicy::ClosingEdge,
            verbosity: 0,
        };
        let result = sort_tasks(&tasks, Strategy::Smart, today(), &options);

        assert!(find(&result, 3).is_circular);
        assert!(!find(&result, 1).is_circular);
        assert!(!find(&result, 2).is_circular);
        assert_eq!(result.last().map(|t| t.task.id.clone()), Some(TaskId::Int(3)));
    }

    #[test]
    fn test_circular_tasks_skip_every_strategy() {
        let tasks = vec![
            make_task(1, "2025-11-28", 1.0, 9, &[2]),
            make_task(2, "2025-11-28", 1.0, 9, &[1]),
            make_task(3, "2099-01-01", 1.0, 1, &[1]),
        ];
        for strategy in Strategy::ALL {
            let result = rank(&tasks, strategy);
            assert!(find(&result, 1).is_circular, "{strategy}");
            assert!(find(&result, 2).is_circular, "{strategy}");
            assert!(!find(&result, 3).is_circular, "{strategy}");
            assert_eq!(find(&result, 1).eisenhower_quadrant, None);
        }
    }

    #[test]
    fn test_dependent_of_cycle_is_scored() {
        let tasks = vec![
            make_task(1, "2099-01-01", 5.0, 5, &[2]),
            make_task(2, "2099-01-01", 5.0, 5, &[1]),
            make_task(3, "2099-01-01", 5.0, 5, &[1]),
        ];
        let result = rank(&tasks, Strategy::Smart);
        assert_eq!(find(&result, 1).priority_score, CIRCULAR_SCORE);
        assert_eq!(find(&result, 3).priority_score, 20.0);
        assert_eq!(ids(&result)[0], TaskId::Int(3));
    }

    #[test]
    fn test_overlapping_cycles_are_never_suggested() {
        // 2 -> 1 and 2 -> 3 each close a cycle through 2
        let tasks = vec![
            make_task(1, "2025-11-20", 1.0, 9, &[2]),
            make_task(2, "2025-11-20", 1.0, 9, &[1, 3]),
            make_task(3, "2025-11-20", 1.0, 9, &[2]),
            make_task(4, "2099-01-01", 1.0, 5, &[]),
        ];
        let result = rank(&tasks, Strategy::Smart);
        for id in [1, 2, 3] {
            assert!(find(&result, id).is_circular, "task {id}");
        }

        let suggestions = suggest_tasks(&tasks, today(), &SortOptions::default(), 3);
        assert_eq!(ids(&suggestions.suggestions), vec![TaskId::Int(4)]);
    }

    #[test]
    fn test_fastest_strategy() {
        let tasks = vec![
            make_task(1, "2099-01-01", 8.0, 5, &[]),
            make_task(2, "2099-01-01", 0.5, 5, &[]),
            make_task(3, "2099-01-01", 3.0, 5, &[]),
        ];
        let result = rank(&tasks, Strategy::Fastest);
        assert_eq!(ids(&result), vec![TaskId::Int(2), TaskId::Int(3), TaskId::Int(1)]);
        assert_eq!(result[0].explanation, "0.5 hours");
    }

    #[test]
    fn test_impact_strategy_ties_keep_order() {
        let tasks = vec![
            make_task(1, "2099-01-01", 1.0, 4, &[]),
            make_task(2, "2099-01-01", 1.0, 9, &[]),
            make_task(3, "2099-01-01", 1.0, 4, &[]),
            make_task(4, "2099-01-01", 1.0, 9, &[]),
        ];
        let result = rank(&tasks, Strategy::Impact);
        assert_eq!(
            ids(&result),
            vec![TaskId::Int(2), TaskId::Int(4), TaskId::Int(1), TaskId::Int(3)]
        );
        assert_eq!(result[0].explanation, "Importance: 9");
    }

    #[test]
    fn test_deadline_strategy() {
        let tasks = vec![
            make_task(1, "2026-03-01", 1.0, 5, &[]),
            make_task(2, "garbage", 1.0, 5, &[]),
            make_task(3, "2025-12-24", 1.0, 5, &[]),
        ];
        let result = rank(&tasks, Strategy::Deadline);
        // the unparsable date scores 0, above every negated timestamp
        assert_eq!(ids(&result), vec![TaskId::Int(2), TaskId::Int(3), TaskId::Int(1)]);
        assert_eq!(result[0].priority_score, 0.0);
        assert_eq!(result[0].explanation, "garbage");
        assert_eq!(result[1].explanation, "2025-12-24");
    }

    #[test]
    fn test_eisenhower_strategy() {
        let urgent = "2025-11-30";
        let not_urgent = "2025-12-07";
        let tasks = vec![
            make_task(33, not_urgent, 1.0, 4, &[]),
            make_task(32, urgent, 1.0, 4, &[]),
            make_task(31, not_urgent, 1.0, 9, &[]),
            make_task(30, urgent, 1.0, 9, &[]),
        ];
        let result = rank(&tasks, Strategy::Eisenhower);

        let expected = [
            (30, 4.0, EisenhowerQuadrant::Do),
            (31, 3.0, EisenhowerQuadrant::Decide),
            (32, 2.0, EisenhowerQuadrant::Delegate),
            (33, 1.0, EisenhowerQuadrant::Delete),
        ];
        for (position, (id, score, quadrant)) in expected.into_iter().enumerate() {
            assert_eq!(result[position].task.id, TaskId::Int(id));
            assert_eq!(result[position].priority_score, score);
            assert_eq!(result[position].eisenhower_quadrant, Some(quadrant));
            assert_eq!(
                result[position].explanation,
                format!("Quadrant: {}", quadrant.as_str())
            );
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let tasks = vec![
            make_task(1, "2025-11-29", 4.0, 6, &[3]),
            make_task(2, "2025-11-20", 12.0, 2, &[]),
            make_task(3, "2025-12-10", 1.0, 8, &[]),
            make_task(4, "oops", 1.0, 5, &[5]),
            make_task(5, "2025-11-27", 1.0, 5, &[4]),
        ];
        for strategy in Strategy::ALL {
            assert_eq!(rank(&tasks, strategy), rank(&tasks, strategy), "{strategy}");
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(rank(&[], Strategy::Smart).is_empty());
        let suggestions = suggest_tasks(&[], today(), &SortOptions::default(), 3);
        assert!(suggestions.suggestions.is_empty());
        assert_eq!(suggestions.message, SUGGESTION_MESSAGE);
    }

    #[test]
    fn test_suggest_returns_top_positive_tasks() {
        let tasks = vec![
            make_task(1, "2099-01-01", 20.0, 1, &[]),
            make_task(2, "2025-11-20", 1.0, 5, &[]),
            make_task(3, "2025-11-27", 1.0, 8, &[]),
            make_task(4, "2025-11-28", 1.0, 5, &[]),
            make_task(5, "2099-01-01", 1.0, 5, &[6]),
            make_task(6, "2099-01-01", 1.0, 5, &[5]),
        ];
        let result = suggest_tasks(
            &tasks,
            today(),
            &SortOptions::default(),
            DEFAULT_SUGGESTION_LIMIT,
        );

        assert_eq!(
            ids(&result.suggestions),
            vec![TaskId::Int(2), TaskId::Int(3), TaskId::Int(4)]
        );
        assert_eq!(result.message, "Here are your top priorities for today.");
    }

    #[test]
    fn test_suggest_skips_non_positive_scores() {
        // importance 1, 20 hours: 4 - 5 = -1 while not circular
        let tasks = vec![
            make_task(1, "2099-01-01", 20.0, 1, &[]),
            make_task(2, "2099-01-01", 20.0, 2, &[]),
            make_task(3, "2099-01-01", 1.0, 1, &[3]),
        ];
        let result = suggest_tasks(&tasks, today(), &SortOptions::default(), 3);
        assert_eq!(ids(&result.suggestions), vec![TaskId::Int(2)]);
        assert!(result.suggestions.iter().all(|t| t.priority_score > 0.0));
    }
}
