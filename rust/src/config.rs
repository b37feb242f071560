//! Configuration types for the analyzer.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use thiserror::Error;

use crate::cycles::CyclePolicy;
use crate::scoring::Strategy;
use crate::sorting::{SortOptions, DEFAULT_SUGGESTION_LIMIT};

/// Errors from resolving configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown prioritization strategy: {0}")]
    UnknownStrategy(String),
    #[error("Unknown cycle policy: {0}")]
    UnknownCyclePolicy(String),
}

impl From<ConfigError> for PyErr {
    fn from(err: ConfigError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Analyzer settings as passed in from the host.
#[pyclass]
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Strategy: "smart", "fastest", "impact", "deadline", or "eisenhower"
    #[pyo3(get, set)]
    pub strategy: String,
    /// Cycle policy: "cycle_path" or "closing_edge"
    #[pyo3(get, set)]
    pub cycle_policy: String,
    /// Maximum number of tasks returned by `suggest`
    #[pyo3(get, set)]
    pub suggestion_limit: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=decisions, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default().as_str().to_string(),
            cycle_policy: CyclePolicy::default().as_str().to_string(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            verbosity: 0,
        }
    }
}

impl AnalyzerConfig {
    pub fn resolve_strategy(&self) -> Result<Strategy, ConfigError> {
        self.strategy.parse()
    }

    pub fn sort_options(&self) -> Result<SortOptions, ConfigError> {
        Ok(SortOptions {
            cycle_policy: self.cycle_policy.parse()?,
            verbosity: self.verbosity,
        })
    }
}

#[pymethods]
impl AnalyzerConfig {
    #[new]
    #[pyo3(signature = (
        strategy=None,
        cycle_policy=None,
        suggestion_limit=None,
        verbosity=None
    ))]
    fn new(
        strategy: Option<String>,
        cycle_policy: Option<String>,
        suggestion_limit: Option<usize>,
        verbosity: Option<u8>,
    ) -> PyResult<Self> {
        let defaults = Self::default();
        let config = Self {
            strategy: strategy.unwrap_or(defaults.strategy),
            cycle_policy: cycle_policy.unwrap_or(defaults.cycle_policy),
            suggestion_limit: suggestion_limit.unwrap_or(defaults.suggestion_limit),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        };
        // Fail at construction rather than on first use
        config.resolve_strategy()?;
        config.sort_options()?;
        Ok(config)
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalyzerConfig(strategy={:?}, cycle_policy={:?}, suggestion_limit={})",
            self.strategy, self.cycle_policy, self.suggestion_limit
        )
    }
}
