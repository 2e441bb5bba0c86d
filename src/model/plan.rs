use serde::{Deserialize, Serialize};

use super::task::Task;

/// A research goal centered on one ancestor, made up of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlanRecord")]
pub struct Plan {
    /// Ancestor display name (kept in sync with `ancestor_link` when linked)
    pub ancestor: String,
    /// Pointer of the linked reference individual, empty when unlinked
    pub ancestor_link: String,
    pub goal: String,
    /// Tasks in display order
    pub tasks: Vec<Task>,
}

/// On-disk shape of a plan, tolerant of older files.
///
/// Early project files stored the ancestor under `title`.
#[derive(Deserialize)]
struct PlanRecord {
    #[serde(default)]
    ancestor: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    ancestor_link: String,
    #[serde(default)]
    goal: String,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl From<PlanRecord> for Plan {
    fn from(record: PlanRecord) -> Self {
        Plan {
            ancestor: record.ancestor.or(record.title).unwrap_or_default(),
            ancestor_link: record.ancestor_link,
            goal: record.goal,
            tasks: record.tasks,
        }
    }
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new open task and return it
    pub fn add_task(&mut self) -> &mut Task {
        self.tasks.push(Task::new());
        let last = self.tasks.len() - 1;
        &mut self.tasks[last]
    }

    /// Remove the task at `index`. Out-of-range indices are ignored.
    pub fn delete_task(&mut self, index: usize) {
        if index < self.tasks.len() {
            self.tasks.remove(index);
        }
    }

    pub fn is_linked(&self) -> bool {
        !self.ancestor_link.is_empty()
    }

    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_open())
    }

    /// A plan is complete once it has tasks and none of them is open
    pub fn is_complete(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| !t.is_open())
    }
}
