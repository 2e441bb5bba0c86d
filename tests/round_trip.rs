use grant::io::project_io::{load_project, parse_project, save_project_to, serialize_project};
use grant::model::Outcome;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Load a fixture, write it out, read it back and compare the documents
fn assert_round_trip(fixture_name: &str) {
    let project = load_project(&fixture(fixture_name))
        .unwrap_or_else(|e| panic!("Could not load fixture {}: {}", fixture_name, e));
    let text = serialize_project(&project).unwrap();
    let reparsed = parse_project(&text).unwrap();

    assert_eq!(
        reparsed, project,
        "Round-trip failed for fixture: {}",
        fixture_name
    );
}

// ============================================================================
// Round-trip tests
// ============================================================================

#[test]
fn round_trip_full_project() {
    assert_round_trip("weir_project.yaml");
}

#[test]
fn round_trip_legacy_project() {
    assert_round_trip("legacy_title.yaml");
}

#[test]
fn round_trip_legacy_unlinked_project() {
    assert_round_trip("legacy_unlinked.yaml");
}

#[test]
fn round_trip_empty_project() {
    assert_round_trip("empty.yaml");
}

// ============================================================================
// Content checks
// ============================================================================

#[test]
fn full_project_contents() {
    let project = load_project(&fixture("weir_project.yaml")).unwrap();
    assert_eq!(project.filename, fixture("weir_project.yaml"));
    assert_eq!(project.gedcom, "weir_tree.yaml");
    assert_eq!(project.plans.len(), 2);

    let weir = &project.plans[0];
    assert_eq!(weir.ancestor, "John Weir (1820-1888)");
    assert_eq!(weir.ancestor_link, "I1");
    assert_eq!(weir.tasks.len(), 2);
    let result = weir.tasks[0].result.as_ref().unwrap();
    assert_eq!(result.outcome(), Outcome::Nil);
    assert_eq!(result.to_string(), "2023-03-01 nil: No entry");
    assert!(weir.tasks[1].is_open());
    assert!(!weir.is_complete());

    let downton = &project.plans[1];
    assert!(downton.is_complete());
    assert_eq!(
        downton.tasks[0].result.as_ref().unwrap().to_string(),
        "2023-04-12 success: Bond found [FILM 104]"
    );
}

#[test]
fn legacy_title_becomes_ancestor() {
    let project = load_project(&fixture("legacy_title.yaml")).unwrap();
    assert_eq!(project.version, "1.0");
    assert_eq!(project.plans[0].ancestor, "Ann Lee");

    // Saved files use the current field name
    let text = serialize_project(&project).unwrap();
    assert!(text.contains("ancestor: Ann Lee"));
    assert!(!text.contains("title:"));
}

#[test]
fn legacy_task_title_becomes_source() {
    let project = load_project(&fixture("legacy_unlinked.yaml")).unwrap();
    let plan = &project.plans[0];
    assert_eq!(plan.ancestor, "John Weir");
    let sources: Vec<_> = plan.tasks.iter().map(|t| t.source.as_str()).collect();
    assert_eq!(sources, vec!["Granthill Baptisms", "Old Parish Registers"]);
    assert_eq!(plan.tasks[0].description, "Search 1818-1822");
    assert!(plan.tasks.iter().all(|t| t.is_open()));

    let text = serialize_project(&project).unwrap();
    assert!(text.contains("source: Granthill Baptisms"));
    assert!(!text.contains("title:"));
}

#[test]
fn legacy_none_reference_file_means_unlinked() {
    let project = load_project(&fixture("legacy_unlinked.yaml")).unwrap();
    assert_eq!(project.gedcom, "");
    assert!(!project.has_gedcom());

    let text = serialize_project(&project).unwrap();
    assert!(!text.contains("none"));
}

#[test]
fn empty_file_is_empty_project() {
    let project = load_project(&fixture("empty.yaml")).unwrap();
    assert!(project.plans.is_empty());
    assert!(!project.has_gedcom());
}

#[test]
fn save_and_reload_through_disk() {
    let tmp = TempDir::new().unwrap();
    let mut project = load_project(&fixture("weir_project.yaml")).unwrap();
    project.plans[1].tasks[0].result = None;
    let path = tmp.path().join("copy.yaml");
    save_project_to(&project, &path).unwrap();

    let reloaded = load_project(&path).unwrap();
    assert_eq!(reloaded, project);
    assert!(reloaded.plans[1].tasks[0].is_open());
}
