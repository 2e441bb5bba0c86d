use std::fmt;

use serde::Serialize;

use crate::model::plan::Plan;
use crate::model::task::{Outcome, Task, TaskResult};

/// How the result filter string is interpreted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum ResultFilter {
    /// Empty string: every task passes
    #[default]
    Any,
    /// `open`: tasks without a result
    Open,
    /// `nil` / `success`: tasks with that outcome
    Outcome(Outcome),
    /// Anything else: substring of the rendered result
    Contains(String),
}

impl ResultFilter {
    pub fn parse(s: &str) -> ResultFilter {
        if s.is_empty() {
            return ResultFilter::Any;
        }
        if s == "open" {
            return ResultFilter::Open;
        }
        match Outcome::from_keyword(s) {
            Some(outcome) => ResultFilter::Outcome(outcome),
            None => ResultFilter::Contains(s.to_string()),
        }
    }

    pub fn matches(&self, result: Option<&TaskResult>, ignore_case: bool) -> bool {
        match self {
            ResultFilter::Any => true,
            ResultFilter::Open => result.is_none(),
            ResultFilter::Outcome(outcome) => result.is_some_and(|r| r.outcome() == *outcome),
            ResultFilter::Contains(needle) => {
                result.is_some_and(|r| contains(&r.to_string(), needle, ignore_case))
            }
        }
    }
}

impl From<&str> for ResultFilter {
    fn from(s: &str) -> Self {
        ResultFilter::parse(s)
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultFilter::Any => Ok(()),
            ResultFilter::Open => write!(f, "open"),
            ResultFilter::Outcome(outcome) => write!(f, "{}", outcome),
            ResultFilter::Contains(s) => write!(f, "{}", s),
        }
    }
}

/// The three independent task predicates; a task must pass all of them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    /// Substring of the task's source text
    pub text: String,
    pub result: ResultFilter,
    /// Substring of the owning plan's ancestor
    pub ancestor: String,
    pub ignore_case: bool,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_result(mut self, result: &str) -> Self {
        self.result = ResultFilter::parse(result);
        self
    }

    pub fn with_ancestor(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestor = ancestor.into();
        self
    }

    pub fn ignoring_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// True when every task passes
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.ancestor.is_empty() && self.result == ResultFilter::Any
    }

    pub fn matches(&self, source: &str, ancestor: &str, result: Option<&TaskResult>) -> bool {
        contains(source, &self.text, self.ignore_case)
            && contains(ancestor, &self.ancestor, self.ignore_case)
            && self.result.matches(result, self.ignore_case)
    }

    pub fn matches_task(&self, plan: &Plan, task: &Task) -> bool {
        self.matches(&task.source, &plan.ancestor, task.result.as_ref())
    }
}

fn contains(haystack: &str, needle: &str, ignore_case: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if ignore_case {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    } else {
        haystack.contains(needle)
    }
}
