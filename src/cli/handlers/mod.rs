mod init;
pub use init::cmd_new;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError};
use crate::io::project_io;
use crate::io::reference_io::{self, ExtractLoader, ReferenceLoader};
use crate::model::config::Config;
use crate::model::project::Project;
use crate::model::reference::{RecordKind, ReferenceSet};
use crate::model::task::{Outcome, TaskResult};
use crate::ops::overview::overview;
use crate::ops::reconcile::{self, CommitOutcome, Confirm, LinkUpdater};
use crate::view::{Column, ItemModel, ModelIndex, NodeKind, TaskFilter, TreeModel, Value, Workspace};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = load_settings(cli.config.as_deref())?;
    let file = cli.file.as_deref();

    match cli.command {
        Commands::New(args) => cmd_new(args, json),

        // Read commands
        Commands::Show => cmd_show(file, json),
        Commands::Overview(args) => cmd_overview(args, file, json),
        Commands::Tasks(args) => cmd_tasks(args, file, &config, json),
        Commands::Complete(args) => cmd_complete(args, file, &config, json),

        // Write commands
        Commands::AddPlan(args) => cmd_add_plan(args, file, &config),
        Commands::AddTask(args) => cmd_add_task(args, file, &config),
        Commands::Edit(args) => cmd_edit(args, file, &config),
        Commands::Result(args) => cmd_result(args, file, &config),
        Commands::Delete(args) => cmd_delete(args, file, &config),
        Commands::Link(args) => cmd_link(args, file),
        Commands::LinkRecord(args) => cmd_link_record(args, file, &config),
        Commands::Reconcile(args) => cmd_reconcile(args, file, &config, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_settings(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(config_io::config_path);
    config_io::load_config(&path)
}

fn load_project_arg(file: Option<&str>) -> Result<Project, Box<dyn std::error::Error>> {
    let path = file.ok_or("no project file given (use -f <FILE>)")?;
    Ok(project_io::load_project(Path::new(path))?)
}

fn open_workspace(file: Option<&str>, config: &Config) -> Result<Workspace, Box<dyn std::error::Error>> {
    let project = load_project_arg(file)?;
    let filter = TaskFilter::new().ignoring_case(config.filter.ignore_case);
    Ok(Workspace::with_project(project, filter))
}

fn save_workspace(workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
    let project = workspace.project().ok_or("no project loaded")?;
    project_io::save_project(project)?;
    Ok(())
}

/// Reference file to read: an explicit path, or the project's own link
fn reference_file(project: &Project, explicit: Option<&str>) -> Result<PathBuf, String> {
    match explicit {
        Some(path) => Ok(PathBuf::from(path)),
        None if project.has_gedcom() => Ok(reference_io::resolve_reference_path(
            &project.filename,
            &project.gedcom,
        )),
        None => Err("project has no reference file (use `grant link <FILE>` or --references)".to_string()),
    }
}

fn load_references(
    workspace: &mut Workspace,
    explicit: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = workspace.project().ok_or("no project loaded")?;
    let path = reference_file(project, explicit)?;
    workspace.load_references(&ExtractLoader, &path)?;
    Ok(())
}

/// A 1-based plan number with an optional 1-based task number: `2` or `2.1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Address {
    plan: usize,
    task: Option<usize>,
}

fn parse_address(s: &str) -> Result<Address, String> {
    let number = |part: &str| -> Result<usize, String> {
        match part.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("invalid address '{}' (expected e.g. 2 or 2.1)", s)),
        }
    };
    match s.split_once('.') {
        Some((plan, task)) => Ok(Address {
            plan: number(plan)?,
            task: Some(number(task)?),
        }),
        None => Ok(Address {
            plan: number(s)?,
            task: None,
        }),
    }
}

fn resolve(tree: &TreeModel, address: &str) -> Result<ModelIndex, String> {
    let parsed = parse_address(address)?;
    let plan = tree.index(parsed.plan - 1, 0, &ModelIndex::invalid());
    if !plan.is_valid() {
        return Err(format!("no plan {}", parsed.plan));
    }
    match parsed.task {
        None => Ok(plan),
        Some(task) => {
            let index = tree.index(task - 1, 0, &plan);
            if index.is_valid() {
                Ok(index)
            } else {
                Err(format!("no task {}", address))
            }
        }
    }
}

/// Printable address of a tree index
fn address_of(tree: &TreeModel, index: &ModelIndex) -> String {
    let parent = tree.parent(index);
    if parent.is_valid() {
        format!("{}.{}", parent.row() + 1, index.row() + 1)
    } else {
        (index.row() + 1).to_string()
    }
}

fn set_text(
    workspace: &mut Workspace,
    index: &ModelIndex,
    column: Column,
    value: Option<String>,
) -> bool {
    match value {
        Some(value) => workspace.set(index, column.index(), Value::Text(value)),
        None => false,
    }
}

/// Asks on stderr and reads the answer from stdin; anything but yes declines
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        eprintln!("{}", message);
        eprint!("[y/N] ");
        io::stderr().flush().ok();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(file: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project_arg(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&project_to_json(&project))?);
    } else {
        for line in format_project_tree(&project) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_overview(
    args: OverviewArgs,
    file: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project_arg(file)?;
    let references = if args.references {
        let path = reference_file(&project, None)?;
        ExtractLoader.load(&path)?
    } else {
        ReferenceSet::default()
    };
    let summary = overview(&project, &references);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in format_overview(&summary, args.references) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_tasks(
    args: TasksArgs,
    file: Option<&str>,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let filter = TaskFilter::new()
        .with_text(args.text.unwrap_or_default())
        .with_result(args.result.as_deref().unwrap_or(""))
        .with_ancestor(args.ancestor.unwrap_or_default())
        .ignoring_case(args.ignore_case || config.filter.ignore_case);
    workspace.set_filter(filter);

    let tasks = workspace.tasks();
    let top = ModelIndex::invalid();
    let rows: Vec<TaskRowJson> = (0..tasks.row_count(&top))
        .map(|row| {
            let index = tasks.index(row, 0, &top);
            let source = tasks.source().map_to_source(&tasks.map_to_source(&index));
            TaskRowJson {
                address: address_of(workspace.tree(), &source),
                source: tasks.text(&index, Column::Text),
                ancestor: tasks.text(&index, Column::Ancestor),
                description: tasks.text(&index, Column::Description),
                result: tasks.result(&index).map(|r| r.to_string()),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}", format_task_row(row));
        }
    }
    Ok(())
}

fn cmd_complete(
    args: CompleteArgs,
    file: Option<&str>,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    load_references(&mut workspace, args.references.as_deref())?;
    let kind = match args.kind {
        RecordArg::Individual => RecordKind::Individual,
        RecordArg::Source => RecordKind::Source,
    };
    let matches = workspace.references().complete(kind, &args.fragment);
    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        for m in &matches {
            println!("{}\t{}", m.pointer, m.display_name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add_plan(
    args: AddPlanArgs,
    file: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let index = workspace.add_node(&ModelIndex::invalid());
    if !index.is_valid() {
        return Err("could not add a plan".into());
    }
    set_text(&mut workspace, &index, Column::Text, args.ancestor);
    set_text(&mut workspace, &index, Column::Description, args.goal);
    save_workspace(&workspace)?;
    println!("{}", address_of(workspace.tree(), &index));
    Ok(())
}

fn cmd_add_task(
    args: AddTaskArgs,
    file: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let plan = resolve(workspace.tree(), &args.plan)?;
    if workspace.tree().kind(&plan) != Some(NodeKind::Plan) {
        return Err(format!("{} is not a plan", args.plan).into());
    }
    let index = workspace.add_node(&plan);
    if !index.is_valid() {
        return Err(format!("could not add a task to plan {}", args.plan).into());
    }
    set_text(&mut workspace, &index, Column::Text, args.source);
    set_text(&mut workspace, &index, Column::Description, args.description);
    save_workspace(&workspace)?;
    println!("{}", address_of(workspace.tree(), &index));
    Ok(())
}

fn cmd_edit(args: EditArgs, file: Option<&str>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if args.text.is_none() && args.description.is_none() {
        return Err("nothing to change (use --text or --description)".into());
    }
    let mut workspace = open_workspace(file, config)?;
    let index = resolve(workspace.tree(), &args.address)?;
    set_text(&mut workspace, &index, Column::Text, args.text);
    set_text(&mut workspace, &index, Column::Description, args.description);
    save_workspace(&workspace)?;
    Ok(())
}

fn cmd_result(
    args: ResultArgs,
    file: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let index = resolve(workspace.tree(), &args.address)?;
    if workspace.tree().kind(&index) != Some(NodeKind::Task) {
        return Err(format!("{} is not a task", args.address).into());
    }

    let outcome = match args.action {
        ResultAction::Nil => Some(Outcome::Nil),
        ResultAction::Success => Some(Outcome::Success),
        ResultAction::Clear => None,
    };
    let result = match outcome {
        Some(outcome) => {
            let result = match args.date.as_deref() {
                Some(date) => {
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|e| format!("invalid date '{}': {}", date, e))?;
                    TaskResult::dated(outcome, date)
                }
                None => TaskResult::new(outcome),
            };
            Some(
                result
                    .with_summary(args.summary.unwrap_or_default())
                    .with_document(args.document.unwrap_or_default()),
            )
        }
        None => None,
    };

    let rendered = result.as_ref().map(|r| r.to_string());
    workspace.set(&index, Column::Result.index(), Value::Result(result));
    save_workspace(&workspace)?;
    match rendered {
        Some(text) => println!("{} {}", args.address, text),
        None => println!("{} open", args.address),
    }
    Ok(())
}

fn cmd_delete(args: DeleteArgs, file: Option<&str>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let index = resolve(workspace.tree(), &args.address)?;
    workspace.delete_node(&index);
    save_workspace(&workspace)?;
    println!("deleted {}", args.address);
    Ok(())
}

fn cmd_link(args: LinkArgs, file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut project = load_project_arg(file)?;
    if args.clear {
        project.gedcom.clear();
    } else if let Some(path) = args.path {
        project.gedcom = path;
    } else {
        if project.has_gedcom() {
            println!("{}", project.gedcom);
        }
        return Ok(());
    }
    project_io::save_project(&project)?;
    Ok(())
}

fn cmd_link_record(
    args: LinkRecordArgs,
    file: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    let index = resolve(workspace.tree(), &args.address)?;
    let kind = workspace
        .tree()
        .kind(&index)
        .and_then(reconcile::record_kind)
        .ok_or_else(|| format!("{} cannot be linked", args.address))?;

    if args.clear {
        reconcile::unlink_record(&mut workspace, &index);
    } else {
        let pointer = args
            .pointer
            .as_deref()
            .ok_or("missing record pointer (or use --clear)")?;
        load_references(&mut workspace, args.references.as_deref())?;
        let references = workspace.references().clone();
        if !reconcile::link_record(&mut workspace, &index, kind, pointer, &references) {
            let count = references.lookup(kind, pointer).len();
            return Err(format!("pointer {} matches {} records, expected exactly one", pointer, count).into());
        }
        println!("{}", workspace.tree().text(&index, Column::Text));
    }
    save_workspace(&workspace)?;
    Ok(())
}

fn cmd_reconcile(
    args: ReconcileArgs,
    file: Option<&str>,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(file, config)?;
    load_references(&mut workspace, args.references.as_deref())?;

    let mut updater = LinkUpdater::new();
    let summary = updater.scan(workspace.tree(), workspace.references());
    let edits: Vec<EditJson> = updater.pending().iter().map(edit_to_json).collect();
    if !json {
        for edit in updater.pending() {
            println!("{}", format_pending_edit(edit));
        }
    }

    let outcome = if args.dry_run {
        CommitOutcome::NothingToDo
    } else if args.yes || !config.reconcile.confirm {
        updater.commit(&mut workspace, &mut |_: &str| true)
    } else {
        updater.commit(&mut workspace, &mut StdinConfirm)
    };
    let applied = matches!(outcome, CommitOutcome::Applied { .. });
    if applied {
        save_workspace(&workspace)?;
    }

    if json {
        let output = ReconcileJson {
            summary,
            edits,
            applied,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match outcome {
            _ if summary.is_empty() => println!("links are up to date"),
            CommitOutcome::Applied { written } => println!("applied {} changes", written),
            CommitOutcome::Declined { .. } => println!("no changes applied"),
            CommitOutcome::NothingToDo => println!("{} changes pending", summary.total()),
        }
    }
    Ok(())
}
