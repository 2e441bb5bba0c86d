use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use super::plan::Plan;
use super::task::Task;

/// Schema version written to new project files
pub const PROJECT_VERSION: &str = "1.0";

/// What early project files wrote for "no reference file"
const LEGACY_NO_GEDCOM: &str = "none";

fn default_version() -> String {
    PROJECT_VERSION.to_string()
}

fn gedcom_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let path = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if path == LEGACY_NO_GEDCOM {
        Ok(String::new())
    } else {
        Ok(path)
    }
}

/// All the research plans kept in one project file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: String,
    /// Path of the linked reference file, empty when unlinked
    #[serde(default, deserialize_with = "gedcom_path")]
    pub gedcom: String,
    /// Plans in display order
    #[serde(default)]
    pub plans: Vec<Plan>,

    /// File this project was loaded from / will be saved to
    #[serde(skip)]
    pub filename: PathBuf,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            version: default_version(),
            gedcom: String::new(),
            plans: Vec::new(),
            filename: PathBuf::new(),
        }
    }
}

impl Project {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Project {
            filename: filename.into(),
            ..Project::default()
        }
    }

    /// Whether a reference file is linked to this project
    pub fn has_gedcom(&self) -> bool {
        !self.gedcom.is_empty()
    }

    /// Append a new plan and return it
    pub fn add_plan(&mut self) -> &mut Plan {
        self.plans.push(Plan::new());
        let last = self.plans.len() - 1;
        &mut self.plans[last]
    }

    /// Remove the plan at `index`. Out-of-range indices are ignored.
    pub fn delete_plan(&mut self, index: usize) {
        if index < self.plans.len() {
            self.plans.remove(index);
        }
    }

    /// Every task of every plan, in display order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.plans.iter().flat_map(|p| p.tasks.iter())
    }

    /// Convert to the nested-map representation written to disk
    pub fn to_value(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        serde_yaml::to_value(self)
    }

    /// Build a project from its nested-map representation.
    ///
    /// Missing fields fall back to their defaults; the filename is left empty.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(value)
    }
}

/// Equality covers the persisted fields only; `filename` is not compared.
impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.gedcom == other.gedcom && self.plans == other.plans
    }
}

impl Eq for Project {}
