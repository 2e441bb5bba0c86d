use serde::Serialize;

use crate::model::plan::Plan;
use crate::model::project::Project;
use crate::model::reference::RecordKind;
use crate::model::task::{Task, TaskResult};
use crate::ops::overview::ProjectOverview;
use crate::ops::reconcile::{LinkAction, PendingEdit, UpdateSummary};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ResultJson {
    pub date: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub document: String,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub address: String,
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_link: String,
    pub description: String,
    pub complete: bool,
    pub result: Option<ResultJson>,
}

#[derive(Serialize)]
pub struct PlanJson {
    pub address: String,
    pub ancestor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ancestor_link: String,
    pub goal: String,
    pub complete: bool,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub file: String,
    pub gedcom: String,
    pub plans: Vec<PlanJson>,
}

/// One row of the filtered task list
#[derive(Serialize)]
pub struct TaskRowJson {
    pub address: String,
    pub source: String,
    pub ancestor: String,
    pub description: String,
    pub result: Option<String>,
}

#[derive(Serialize)]
pub struct EditJson {
    pub kind: RecordKind,
    pub action: LinkAction,
    pub current: String,
    pub value: String,
}

#[derive(Serialize)]
pub struct ReconcileJson {
    pub summary: UpdateSummary,
    pub edits: Vec<EditJson>,
    pub applied: bool,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn result_to_json(result: &TaskResult) -> ResultJson {
    ResultJson {
        date: result.date.format("%Y-%m-%d").to_string(),
        outcome: result.outcome().to_string(),
        summary: result.summary.clone(),
        document: result.document.clone(),
    }
}

pub fn task_to_json(address: String, task: &Task) -> TaskJson {
    TaskJson {
        address,
        source: task.source.clone(),
        source_link: task.source_link.clone(),
        description: task.description.clone(),
        complete: !task.is_open(),
        result: task.result.as_ref().map(result_to_json),
    }
}

pub fn plan_to_json(number: usize, plan: &Plan) -> PlanJson {
    PlanJson {
        address: number.to_string(),
        ancestor: plan.ancestor.clone(),
        ancestor_link: plan.ancestor_link.clone(),
        goal: plan.goal.clone(),
        complete: plan.is_complete(),
        tasks: plan
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| task_to_json(format!("{}.{}", number, i + 1), task))
            .collect(),
    }
}

pub fn project_to_json(project: &Project) -> ProjectJson {
    ProjectJson {
        file: project.filename.display().to_string(),
        gedcom: project.gedcom.clone(),
        plans: project
            .plans
            .iter()
            .enumerate()
            .map(|(i, plan)| plan_to_json(i + 1, plan))
            .collect(),
    }
}

pub fn edit_to_json(edit: &PendingEdit) -> EditJson {
    EditJson {
        kind: edit.kind,
        action: edit.action,
        current: edit.current.clone(),
        value: edit.value.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn mark(complete: bool) -> &'static str {
    if complete { "[x]" } else { "[ ]" }
}

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() { "(untitled)" } else { text }
}

/// Plans and their tasks, one line each
pub fn format_project_tree(project: &Project) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, plan) in project.plans.iter().enumerate() {
        let number = i + 1;
        let mut line = format!("{} {} {}", mark(plan.is_complete()), number, or_placeholder(&plan.ancestor));
        if !plan.goal.is_empty() {
            line.push_str(&format!(" - {}", plan.goal));
        }
        lines.push(line);
        for (j, task) in plan.tasks.iter().enumerate() {
            let mut line = format!(
                "    {} {}.{} {}",
                mark(!task.is_open()),
                number,
                j + 1,
                or_placeholder(&task.source)
            );
            if let Some(result) = &task.result {
                line.push_str(&format!("  ({})", result));
            }
            lines.push(line);
        }
    }
    lines
}

pub fn format_task_row(row: &TaskRowJson) -> String {
    let mut line = format!("{} {}", row.address, or_placeholder(&row.source));
    if !row.ancestor.is_empty() {
        line.push_str(&format!("  [{}]", row.ancestor));
    }
    if let Some(result) = &row.result {
        line.push_str(&format!("  ({})", result));
    }
    line
}

pub fn format_overview(overview: &ProjectOverview, with_references: bool) -> Vec<String> {
    let mut lines = vec![
        format!("file: {}", overview.filename),
        format!(
            "plans: {} ({} complete)",
            overview.plans, overview.complete_plans
        ),
        format!("tasks: {} ({} open)", overview.tasks, overview.open_tasks),
        format!(
            "reference file: {}",
            if overview.gedcom.is_empty() { "(none)" } else { overview.gedcom.as_str() }
        ),
        format!(
            "linked: {} plans, {} tasks",
            overview.linked_individuals, overview.linked_sources
        ),
    ];
    if with_references {
        lines.push(format!(
            "records: {} individuals, {} sources",
            overview.individuals, overview.sources
        ));
    }
    lines
}

pub fn format_pending_edit(edit: &PendingEdit) -> String {
    match edit.action {
        LinkAction::Rename => format!("rename: {} -> {}", edit.current, edit.value),
        LinkAction::Break => format!("unlink: {} ({})", edit.current, kind_name(edit.kind)),
    }
}

fn kind_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Individual => "individual",
        RecordKind::Source => "source",
    }
}
