//! End-to-end checks of the tree, flattened and filtered views working
//! together through a `Workspace`.

use chrono::NaiveDate;
use grant::model::{Individual, Outcome, Project, ReferenceSet, Source, TaskResult};
use grant::ops::reconcile::{CommitOutcome, LinkUpdater};
use grant::view::{Column, EventLog, ItemModel, ModelEvent, ModelIndex, TaskFilter, Workspace};
use pretty_assertions::assert_eq;

fn top() -> ModelIndex {
    ModelIndex::invalid()
}

fn two_plans() -> Project {
    let mut project = Project::default();
    let a = project.add_plan();
    a.ancestor = "A".into();
    a.add_task().source = "A1".into();
    a.add_task().source = "A2".into();
    let b = project.add_plan();
    b.ancestor = "B".into();
    b.add_task().source = "B1".into();
    project
}

fn research() -> Project {
    let mut project = Project::default();
    let plan = project.add_plan();
    plan.ancestor = "John Weir".into();
    plan.add_task().source = "Granthill Baptisms".into();
    plan.add_task().source = "Downton Registry".into();
    plan.tasks[1].result = Some(TaskResult::dated(
        Outcome::Nil,
        NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
    ));
    plan.add_task().source = "Kew Archive".into();
    plan.tasks[2].result = Some(TaskResult::dated(
        Outcome::Success,
        NaiveDate::from_ymd_opt(2021, 8, 19).unwrap(),
    ));
    project
}

fn flat_texts(ws: &Workspace) -> Vec<String> {
    let flat = ws.flat();
    (0..flat.row_count(&top()))
        .map(|row| flat.text(&flat.index(row, 0, &top()), Column::Text))
        .collect()
}

fn task_sources(ws: &Workspace) -> Vec<String> {
    let tasks = ws.tasks();
    (0..tasks.row_count(&top()))
        .map(|row| tasks.text(&tasks.index(row, 0, &top()), Column::Text))
        .collect()
}

fn filtered(filter: TaskFilter) -> Vec<String> {
    let ws = Workspace::with_project(research(), filter);
    task_sources(&ws)
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn flatten_lists_plans_before_their_tasks() {
    let ws = Workspace::with_project(two_plans(), TaskFilter::default());
    assert_eq!(flat_texts(&ws), vec!["A", "A1", "A2", "B", "B1"]);
}

#[test]
fn flatten_keeps_identity_after_delete() {
    let mut ws = Workspace::with_project(two_plans(), TaskFilter::default());

    // Tree nodes behind flat rows 2..5 (A2, B, B1) before the delete
    let before: Vec<_> = (2..5)
        .map(|row| {
            let flat = ws.flat();
            let source = flat.map_to_source(&flat.index(row, 0, &top()));
            ws.tree().node_id(&source).unwrap()
        })
        .collect();

    let a = ws.tree().index(0, 0, &top());
    let a1 = ws.tree().index(0, 0, &a);
    ws.delete_node(&a1);

    assert_eq!(flat_texts(&ws), vec!["A", "A2", "B", "B1"]);
    let after: Vec<_> = (1..4)
        .map(|row| {
            let flat = ws.flat();
            let source = flat.map_to_source(&flat.index(row, 0, &top()));
            ws.tree().node_id(&source).unwrap()
        })
        .collect();
    assert_eq!(after, before);

    // A2 is now the first task of A
    let flat = ws.flat();
    let a2 = flat.map_to_source(&flat.index(1, 0, &top()));
    assert_eq!(a2.row(), 0);
}

#[test]
fn flat_events_are_scoped_to_the_affected_rows() {
    let mut ws = Workspace::with_project(two_plans(), TaskFilter::default());
    let log = EventLog::new();
    ws.subscribe_flat(Box::new(log.clone()));

    let a = ws.tree().index(0, 0, &top());
    ws.delete_node(&a);

    assert_eq!(
        log.take(),
        vec![
            ModelEvent::RowsAboutToBeRemoved {
                parent: top(),
                first: 0,
                last: 2
            },
            ModelEvent::RowsRemoved {
                parent: top(),
                first: 0,
                last: 2
            },
        ]
    );
    assert_eq!(flat_texts(&ws), vec!["B", "B1"]);
}

#[test]
fn delete_with_invalid_index_emits_nothing() {
    let mut ws = Workspace::with_project(two_plans(), TaskFilter::default());
    let log = EventLog::new();
    ws.subscribe_tree(Box::new(log.clone()));
    ws.delete_node(&top());
    assert!(log.is_empty());
    assert_eq!(flat_texts(&ws).len(), 5);
}

#[test]
fn unchanged_value_is_not_announced() {
    let mut ws = Workspace::with_project(two_plans(), TaskFilter::default());
    let log = EventLog::new();
    ws.subscribe_tree(Box::new(log.clone()));

    let b = ws.tree().index(1, 0, &top());
    let current = ws.tree().get(&b, Column::Text.index()).unwrap();
    assert!(ws.set(&b, Column::Text.index(), current));
    assert!(log.is_empty());
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn filter_by_text() {
    assert_eq!(
        filtered(TaskFilter::new().with_text("Gran")),
        vec!["Granthill Baptisms"]
    );
}

#[test]
fn filter_by_result_keyword() {
    assert_eq!(
        filtered(TaskFilter::new().with_result("open")),
        vec!["Granthill Baptisms"]
    );
    assert_eq!(
        filtered(TaskFilter::new().with_result("nil")),
        vec!["Downton Registry"]
    );
    assert_eq!(
        filtered(TaskFilter::new().with_result("success")),
        vec!["Kew Archive"]
    );
}

#[test]
fn filter_by_result_substring() {
    assert_eq!(
        filtered(TaskFilter::new().with_result("2023")),
        vec!["Downton Registry"]
    );
}

#[test]
fn filter_predicates_intersect() {
    assert_eq!(
        filtered(TaskFilter::new().with_text("i")),
        vec!["Granthill Baptisms", "Downton Registry", "Kew Archive"]
    );
    assert_eq!(
        filtered(TaskFilter::new().with_text("i").with_result("open")),
        vec!["Granthill Baptisms"]
    );
}

#[test]
fn filter_ignores_case_when_asked() {
    assert!(filtered(TaskFilter::new().with_text("gran")).is_empty());
    assert_eq!(
        filtered(TaskFilter::new().with_text("gran").ignoring_case(true)),
        vec!["Granthill Baptisms"]
    );
}

#[test]
fn filtered_rows_follow_edits() {
    let mut ws = Workspace::with_project(research(), TaskFilter::new().with_result("open"));
    assert_eq!(task_sources(&ws), vec!["Granthill Baptisms"]);

    // Recording a result on the open task drops it from the list
    let plan = ws.tree().index(0, 0, &top());
    let granthill = ws.tree().index(0, 0, &plan);
    let result = Some(TaskResult::dated(
        Outcome::Success,
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
    ));
    assert!(ws.set(&granthill, Column::Result.index(), result.into()));
    assert!(task_sources(&ws).is_empty());

    // A new, empty task is open
    let added = ws.add_node(&plan);
    assert!(added.is_valid());
    assert_eq!(task_sources(&ws), vec![""]);
}

#[test]
fn ancestor_column_follows_plan_rename() {
    let mut ws = Workspace::with_project(research(), TaskFilter::new().with_ancestor("Weir"));
    assert_eq!(task_sources(&ws).len(), 3);

    let plan = ws.tree().index(0, 0, &top());
    assert!(ws.set(&plan, Column::Text.index(), "Mary Downton".into()));
    assert!(task_sources(&ws).is_empty());

    ws.set_ancestor_filter("Downton");
    let tasks = ws.tasks();
    let first = tasks.index(0, 0, &top());
    assert_eq!(tasks.text(&first, Column::Ancestor), "Mary Downton");
}

// ============================================================================
// Reconciliation through the workspace
// ============================================================================

#[test]
fn reconcile_renames_and_unlinks() {
    let mut project = research();
    project.plans[0].ancestor_link = "I1".into();
    project.plans[0].tasks[0].source_link = "S9".into();
    let mut ws = Workspace::with_project(project, TaskFilter::default());
    ws.set_references(ReferenceSet::new(
        vec![Individual::new("I1", "John", "Weir", Some(1820), None)],
        vec![Source::new("S1", "Kew Archive", "", "", "")],
    ));

    let mut updater = LinkUpdater::new();
    let summary = updater.scan(ws.tree(), ws.references());
    assert_eq!(summary.ancestor_renames, 1);
    assert_eq!(summary.source_breaks, 1);
    assert_eq!(summary.total(), 2);

    let outcome = updater.commit(&mut ws, &mut |_: &str| true);
    assert_eq!(outcome, CommitOutcome::Applied { written: 2 });

    let project = ws.project().unwrap();
    assert_eq!(project.plans[0].ancestor, "John Weir (1820-?)");
    assert_eq!(project.plans[0].tasks[0].source_link, "");
    assert_eq!(project.plans[0].tasks[0].source, "Granthill Baptisms");

    // The renamed ancestor reaches the task list
    let tasks = ws.tasks();
    let first = tasks.index(0, 0, &top());
    assert_eq!(tasks.text(&first, Column::Ancestor), "John Weir (1820-?)");
}

#[test]
fn declined_reconcile_changes_nothing() {
    let mut project = research();
    project.plans[0].ancestor_link = "I7".into();
    let mut ws = Workspace::with_project(project.clone(), TaskFilter::default());

    let mut updater = LinkUpdater::new();
    updater.scan(ws.tree(), ws.references());
    let outcome = updater.commit(&mut ws, &mut |_: &str| false);
    assert_eq!(outcome, CommitOutcome::Declined { discarded: 1 });
    assert_eq!(ws.project().unwrap(), &project);
    assert!(!updater.has_pending_updates());
}
