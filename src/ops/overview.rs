use serde::Serialize;

use crate::model::project::Project;
use crate::model::reference::ReferenceSet;

/// Statistics shown for a project and its reference file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectOverview {
    pub filename: String,
    pub plans: usize,
    pub complete_plans: usize,
    pub tasks: usize,
    pub open_tasks: usize,
    /// Reference file path, empty when none is linked
    pub gedcom: String,
    pub individuals: usize,
    pub sources: usize,
    /// Plans linked to an individual
    pub linked_individuals: usize,
    /// Tasks linked to a source
    pub linked_sources: usize,
}

pub fn overview(project: &Project, references: &ReferenceSet) -> ProjectOverview {
    ProjectOverview {
        filename: project.filename.display().to_string(),
        plans: project.plans.len(),
        complete_plans: project.plans.iter().filter(|p| p.is_complete()).count(),
        tasks: project.tasks().count(),
        open_tasks: project.tasks().filter(|t| t.is_open()).count(),
        gedcom: project.gedcom.clone(),
        individuals: references.individuals.len(),
        sources: references.sources.len(),
        linked_individuals: project.plans.iter().filter(|p| p.is_linked()).count(),
        linked_sources: project.tasks().filter(|t| t.is_linked()).count(),
    }
}
