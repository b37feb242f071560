//! Core data types for the analyzer.

use chrono::NaiveDate;
use pyo3::exceptions::PyKeyError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::fmt;

/// Date format accepted for `due_date`.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque task identifier: integer or string.
///
/// `Int(1)` and `Str("1")` are different ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPyObject)]
pub enum TaskId {
    Int(i64),
    Str(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for TaskId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl IntoPy<PyObject> for TaskId {
    fn into_py(self, py: Python<'_>) -> PyObject {
        match self {
            Self::Int(v) => v.into_py(py),
            Self::Str(s) => s.into_py(py),
        }
    }
}

impl ToPyObject for TaskId {
    fn to_object(&self, py: Python<'_>) -> PyObject {
        match self {
            Self::Int(v) => v.to_object(py),
            Self::Str(s) => s.to_object(py),
        }
    }
}

/// A task to be prioritized.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: TaskId,
    #[pyo3(get, set)]
    pub title: String,
    /// Raw due date, expected as `YYYY-MM-DD`. Kept unparsed so malformed
    /// values survive into the output untouched.
    #[pyo3(get, set)]
    pub due_date: Option<String>,
    #[pyo3(get, set)]
    pub estimated_hours: Option<f64>,
    #[pyo3(get, set)]
    pub importance: Option<i32>,
    #[pyo3(get, set)]
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Parsed due date, or `None` when absent or malformed.
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_due_date)
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).ok()
}

/// Read an optional dict entry. Missing keys and explicit `None` are both `None`.
fn optional_item<'py, T: FromPyObject<'py>>(
    data: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<Option<T>> {
    match data.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        id,
        title=None,
        due_date=None,
        estimated_hours=None,
        importance=None,
        dependencies=None
    ))]
    fn new(
        id: TaskId,
        title: Option<String>,
        due_date: Option<String>,
        estimated_hours: Option<f64>,
        importance: Option<i32>,
        dependencies: Option<Vec<TaskId>>,
    ) -> Self {
        Self {
            id,
            title: title.unwrap_or_default(),
            due_date,
            estimated_hours,
            importance,
            dependencies: dependencies.unwrap_or_default(),
        }
    }

    /// Build a task from a JSON-style record.
    ///
    /// Only `id` is required. A `due_date` that is not a string is treated as
    /// absent so it degrades to "Invalid date" during scoring.
    #[staticmethod]
    fn from_dict(data: &Bound<'_, PyDict>) -> PyResult<Self> {
        let id: TaskId = data
            .get_item("id")?
            .ok_or_else(|| PyKeyError::new_err("id"))?
            .extract()?;
        let due_date = data
            .get_item("due_date")?
            .and_then(|value| value.extract::<String>().ok());

        Ok(Self {
            id,
            title: optional_item(data, "title")?.unwrap_or_default(),
            due_date,
            estimated_hours: optional_item(data, "estimated_hours")?,
            importance: optional_item(data, "importance")?,
            dependencies: optional_item(data, "dependencies")?.unwrap_or_default(),
        })
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, title={:?}, due_date={:?}, deps={})",
            self.id,
            self.title,
            self.due_date,
            self.dependencies.len()
        )
    }
}

/// Eisenhower matrix quadrant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EisenhowerQuadrant {
    /// Urgent and important.
    Do,
    /// Important, not urgent.
    Decide,
    /// Urgent, not important.
    Delegate,
    /// Neither.
    Delete,
}

impl EisenhowerQuadrant {
    pub fn classify(urgent: bool, important: bool) -> Self {
        match (urgent, important) {
            (true, true) => Self::Do,
            (false, true) => Self::Decide,
            (true, false) => Self::Delegate,
            (false, false) => Self::Delete,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            Self::Do => 4.0,
            Self::Decide => 3.0,
            Self::Delegate => 2.0,
            Self::Delete => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Do => "Do",
            Self::Decide => "Decide",
            Self::Delegate => "Delegate",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for EisenhowerQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display class for a scored task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A task annotated with its computed priority.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedTask {
    #[pyo3(get)]
    pub task: Task,
    #[pyo3(get)]
    pub priority_score: f64,
    #[pyo3(get)]
    pub explanation: String,
    #[pyo3(get)]
    pub is_circular: bool,
    pub eisenhower_quadrant: Option<EisenhowerQuadrant>,
}

impl AnnotatedTask {
    /// Circular tasks are always shown as high priority so they get noticed.
    pub fn priority_band(&self) -> PriorityBand {
        if self.is_circular || self.priority_score > 60.0 {
            PriorityBand::High
        } else if self.priority_score > 30.0 {
            PriorityBand::Medium
        } else {
            PriorityBand::Low
        }
    }

    /// Write the flat record shape: input fields plus annotations.
    pub fn write_into(&self, dict: &Bound<'_, PyDict>) -> PyResult<()> {
        let task = &self.task;
        dict.set_item("id", &task.id)?;
        dict.set_item("title", &task.title)?;
        if let Some(due_date) = &task.due_date {
            dict.set_item("due_date", due_date)?;
        }
        if let Some(hours) = task.estimated_hours {
            dict.set_item("estimated_hours", hours)?;
        }
        if let Some(importance) = task.importance {
            dict.set_item("importance", importance)?;
        }
        dict.set_item("dependencies", &task.dependencies)?;
        dict.set_item("priority_score", self.priority_score)?;
        dict.set_item("explanation", &self.explanation)?;
        dict.set_item("is_circular", self.is_circular)?;
        if let Some(quadrant) = self.eisenhower_quadrant {
            dict.set_item("eisenhower_quadrant", quadrant.as_str())?;
        }
        Ok(())
    }
}

#[pymethods]
impl AnnotatedTask {
    #[getter(eisenhower_quadrant)]
    fn py_eisenhower_quadrant(&self) -> Option<&'static str> {
        self.eisenhower_quadrant.map(EisenhowerQuadrant::as_str)
    }

    #[getter(priority_band)]
    fn py_priority_band(&self) -> &'static str {
        self.priority_band().as_str()
    }

    #[getter(id)]
    fn py_id(&self) -> TaskId {
        self.task.id.clone()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        self.write_into(&dict)?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "AnnotatedTask(id={}, priority_score={}, is_circular={}, explanation={:?})",
            self.task.id, self.priority_score, self.is_circular, self.explanation
        )
    }
}

/// Top suggestions for today, with the advisory message shown alongside them.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestions {
    #[pyo3(get)]
    pub suggestions: Vec<AnnotatedTask>,
    #[pyo3(get)]
    pub message: String,
}

#[pymethods]
impl Suggestions {
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let records = self
            .suggestions
            .iter()
            .map(|s| s.to_dict(py))
            .collect::<PyResult<Vec<_>>>()?;
        let dict = PyDict::new_bound(py);
        dict.set_item("suggestions", records)?;
        dict.set_item("message", &self.message)?;
        Ok(dict)
    }

    fn __len__(&self) -> usize {
        self.suggestions.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Suggestions(count={}, message={:?})",
            self.suggestions.len(),
            self.message
        )
    }
}
