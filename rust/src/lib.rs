//! Rust implementation of the task analyzer's prioritization engine.
//!
//! Ranks a batch of tasks under one of several scoring strategies and flags
//! tasks caught in circular dependencies. The engine itself never reads the
//! clock: "today" is always passed in, and only the Python entry points fall
//! back to the local date when the caller leaves it out.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::{Local, NaiveDate};
use pyo3::prelude::*;

mod config;
pub mod cycles;
mod interner;
pub mod logging;
mod models;
pub mod scoring;
pub mod sorting;

pub use config::{AnalyzerConfig, ConfigError};
pub use cycles::{detect_cycles, CycleDetector, CyclePolicy};
pub use models::{
    parse_due_date, AnnotatedTask, EisenhowerQuadrant, PriorityBand, Suggestions, Task, TaskId,
};
pub use scoring::{is_weekend, score_task, Score, Strategy, TaskIndex};
pub use sorting::{
    sort_tasks, suggest_tasks, SortOptions, CIRCULAR_EXPLANATION, CIRCULAR_SCORE,
    DEFAULT_SUGGESTION_LIMIT, SUGGESTION_MESSAGE,
};

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Rank tasks by priority.
///
/// # Arguments
/// * `tasks` - Tasks to rank
/// * `strategy` - Strategy name; overrides `config.strategy` when given
/// * `today` - Date to score against (defaults to the local date)
/// * `config` - Analyzer configuration (defaults to `AnalyzerConfig()`)
///
/// # Returns
/// * One `AnnotatedTask` per input task, highest priority first
///
/// # Raises
/// * ValueError for an unknown strategy or cycle policy
#[pyfunction]
#[pyo3(signature = (tasks, strategy=None, today=None, config=None))]
fn analyze(
    tasks: Vec<Task>,
    strategy: Option<String>,
    today: Option<NaiveDate>,
    config: Option<AnalyzerConfig>,
) -> PyResult<Vec<AnnotatedTask>> {
    let config = config.unwrap_or_default();
    let strategy = match strategy {
        Some(name) => name.parse::<Strategy>()?,
        None => config.resolve_strategy()?,
    };
    let options = config.sort_options()?;

    Ok(sort_tasks(&tasks, strategy, resolve_today(today), &options))
}

/// Suggest the top tasks to work on today using the `smart` strategy.
///
/// # Raises
/// * ValueError for an unknown cycle policy
#[pyfunction]
#[pyo3(signature = (tasks, today=None, config=None))]
fn suggest(
    tasks: Vec<Task>,
    today: Option<NaiveDate>,
    config: Option<AnalyzerConfig>,
) -> PyResult<Suggestions> {
    let config = config.unwrap_or_default();
    let options = config.sort_options()?;

    Ok(suggest_tasks(
        &tasks,
        resolve_today(today),
        &options,
        config.suggestion_limit,
    ))
}

#[pyfunction]
#[pyo3(name = "is_weekend")]
fn py_is_weekend(day: NaiveDate) -> bool {
    is_weekend(day)
}

/// The task_analyzer.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<AnnotatedTask>()?;
    m.add_class::<Suggestions>()?;

    // Config types
    m.add_class::<AnalyzerConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_function(wrap_pyfunction!(suggest, m)?)?;
    m.add_function(wrap_pyfunction!(py_is_weekend, m)?)?;

    m.add("STRATEGIES", Strategy::ALL.map(Strategy::as_str).to_vec())?;
    m.add("SUGGESTION_MESSAGE", SUGGESTION_MESSAGE)?;

    Ok(())
}
