use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The two ways a finished task can turn out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The search found nothing
    Nil,
    /// The search found what it was looking for
    Success,
}

impl Outcome {
    /// Parse the literal `nil` / `success` used by the result filter and the CLI
    pub fn from_keyword(s: &str) -> Option<Outcome> {
        match s {
            "nil" => Some(Outcome::Nil),
            "success" => Some(Outcome::Success),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Nil => write!(f, "nil"),
            Outcome::Success => write!(f, "success"),
        }
    }
}

/// The recorded outcome of a task.
///
/// A result is only ever replaced wholesale or removed from its task; the
/// model never resets individual fields back to a blank state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Day the result was recorded
    pub date: NaiveDate,
    /// True when the search came up empty
    pub nil: bool,
    #[serde(default)]
    pub summary: String,
    /// Identifier of the document that was found (film number, URL, ...)
    #[serde(default)]
    pub document: String,
}

impl TaskResult {
    /// Create a result dated today
    pub fn new(outcome: Outcome) -> Self {
        Self::dated(outcome, Local::now().date_naive())
    }

    pub fn dated(outcome: Outcome, date: NaiveDate) -> Self {
        TaskResult {
            date,
            nil: outcome == Outcome::Nil,
            summary: String::new(),
            document: String::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = document.into();
        self
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    pub fn outcome(&self) -> Outcome {
        if self.nil {
            Outcome::Nil
        } else {
            Outcome::Success
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.outcome())?;
        if !self.summary.is_empty() {
            write!(f, ": {}", self.summary)?;
        }
        if !self.document.is_empty() {
            write!(f, " [{}]", self.document)?;
        }
        Ok(())
    }
}

/// A single search against a source, belonging to a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord")]
pub struct Task {
    /// Source citation text (kept in sync with `source_link` when linked)
    pub source: String,
    /// Pointer of the linked reference source, empty when unlinked
    pub source_link: String,
    pub description: String,
    /// `None` while the task is still open
    pub result: Option<TaskResult>,
}

/// On-disk shape of a task. Early project files stored the source under
/// `title`.
#[derive(Deserialize)]
struct TaskRecord {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source_link: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    result: Option<TaskResult>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task {
            source: record.source.or(record.title).unwrap_or_default(),
            source_link: record.source_link,
            description: record.description,
            result: record.result,
        }
    }
}

impl Task {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task is open until a result has been recorded
    pub fn is_open(&self) -> bool {
        self.result.is_none()
    }

    pub fn is_linked(&self) -> bool {
        !self.source_link.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_task_is_open() {
        let task = Task::new();
        assert!(task.is_open());
        assert!(!task.is_linked());
        assert_eq!(task.source, "");
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_new_result_is_dated_today() {
        let result = TaskResult::new(Outcome::Success);
        assert_eq!(result.date, Local::now().date_naive());
        assert!(!result.is_nil());
    }

    #[test]
    fn test_nil_result_display_mentions_nil() {
        let result = TaskResult::dated(Outcome::Nil, date(2023, 4, 1)).with_summary("Not listed");
        assert_eq!(result.to_string(), "2023-04-01 nil: Not listed");
        assert_eq!(result.outcome(), Outcome::Nil);
    }

    #[test]
    fn test_success_result_display_omits_nil() {
        let result = TaskResult::dated(Outcome::Success, date(2021, 12, 24))
            .with_summary("Baptism entry")
            .with_document("Film 1234");
        let text = result.to_string();
        assert!(!text.contains("nil"));
        assert_eq!(text, "2021-12-24 success: Baptism entry [Film 1234]");
    }

    #[test]
    fn test_result_display_without_summary() {
        let result = TaskResult::dated(Outcome::Nil, date(2020, 1, 2));
        assert_eq!(result.to_string(), "2020-01-02 nil");
    }

    #[test]
    fn test_outcome_keywords() {
        assert_eq!(Outcome::from_keyword("nil"), Some(Outcome::Nil));
        assert_eq!(Outcome::from_keyword("success"), Some(Outcome::Success));
        assert_eq!(Outcome::from_keyword("Nil"), None);
        assert_eq!(Outcome::from_keyword("open"), None);
    }

    #[test]
    fn test_task_missing_fields_default() {
        let task: Task = serde_yaml::from_str("{}").unwrap();
        assert_eq!(task, Task::default());
    }

    #[test]
    fn test_legacy_title_is_read_as_source() {
        let task: Task =
            serde_yaml::from_str("title: Granthill Baptisms\ndescription: d\nstatus: active\n").unwrap();
        assert_eq!(task.source, "Granthill Baptisms");
        assert_eq!(task.description, "d");
        assert!(task.is_open());

        let value = serde_yaml::to_value(&task).unwrap();
        assert_eq!(value["source"], serde_yaml::Value::from("Granthill Baptisms"));
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_source_wins_over_legacy_title() {
        let task: Task = serde_yaml::from_str("source: New\ntitle: Old\n").unwrap();
        assert_eq!(task.source, "New");
    }

    #[test]
    fn test_result_serializes_four_fields() {
        let result = TaskResult::dated(Outcome::Success, date(2022, 3, 5))
            .with_summary("S")
            .with_document("D");
        let value = serde_yaml::to_value(&result).unwrap();
        assert_eq!(value.as_mapping().unwrap().len(), 4);
        assert_eq!(value["date"], serde_yaml::Value::from("2022-03-05"));
        assert_eq!(value["nil"], serde_yaml::Value::from(false));
    }
}
