use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "grant", about = concat!("grant v", env!("CARGO_PKG_VERSION"), " - genealogy research planner"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project file to work on
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<String>,

    /// Read settings from this file instead of the user config
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty project file
    New(NewArgs),
    /// Show plans and tasks with completion marks
    Show,
    /// Show project statistics
    Overview(OverviewArgs),
    /// List tasks, optionally filtered
    Tasks(TasksArgs),
    /// Add a plan
    AddPlan(AddPlanArgs),
    /// Add a task to a plan
    AddTask(AddTaskArgs),
    /// Change the text or description of a plan or task
    Edit(EditArgs),
    /// Record or clear a task result
    Result(ResultArgs),
    /// Delete a plan (with its tasks) or a task
    Delete(DeleteArgs),
    /// Set or clear the project's reference file
    Link(LinkArgs),
    /// Link a plan to an individual or a task to a source
    LinkRecord(LinkRecordArgs),
    /// Complete a name against the reference records
    Complete(CompleteArgs),
    /// Bring linked names up to date with the reference file
    Reconcile(ReconcileArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NewArgs {
    /// Path of the project file to create
    pub path: String,
    /// Reference file to link right away
    #[arg(long)]
    pub gedcom: Option<String>,
}

#[derive(Args)]
pub struct OverviewArgs {
    /// Also count records in the linked reference file
    #[arg(long)]
    pub references: bool,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Only tasks whose source contains this text
    #[arg(long)]
    pub text: Option<String>,
    /// Result filter: open, nil, success, or text contained in the result
    #[arg(long)]
    pub result: Option<String>,
    /// Only tasks whose plan's ancestor contains this text
    #[arg(long)]
    pub ancestor: Option<String>,
    /// Match without regard to case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddPlanArgs {
    /// Ancestor name
    #[arg(long)]
    pub ancestor: Option<String>,
    /// Research goal
    #[arg(long)]
    pub goal: Option<String>,
}

#[derive(Args)]
pub struct AddTaskArgs {
    /// Plan number
    pub plan: String,
    /// Source to search
    #[arg(long)]
    pub source: Option<String>,
    /// What to look for
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Plan (`2`) or task (`2.1`) address
    pub address: String,
    /// New ancestor (plan) or source (task)
    #[arg(long)]
    pub text: Option<String>,
    /// New goal (plan) or description (task)
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ResultAction {
    Nil,
    Success,
    Clear,
}

#[derive(Args)]
pub struct ResultArgs {
    /// Task address, e.g. `2.1`
    pub address: String,
    /// Outcome to record, or `clear` to reopen the task
    #[arg(value_enum)]
    pub action: ResultAction,
    #[arg(long)]
    pub summary: Option<String>,
    /// Document identifier (film number, URL, ...)
    #[arg(long)]
    pub document: Option<String>,
    /// Date of the result, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Plan or task address
    pub address: String,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Reference file path
    pub path: Option<String>,
    /// Remove the link instead
    #[arg(long, conflicts_with = "path")]
    pub clear: bool,
}

#[derive(Args)]
pub struct LinkRecordArgs {
    /// Plan or task address
    pub address: String,
    /// Record pointer (individual for plans, source for tasks)
    pub pointer: Option<String>,
    /// Remove the record link instead
    #[arg(long, conflicts_with = "pointer")]
    pub clear: bool,
    /// Read records from this file instead of the project's reference file
    #[arg(long)]
    pub references: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RecordArg {
    Individual,
    Source,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Which records to search
    #[arg(value_enum)]
    pub kind: RecordArg,
    /// Part of the display name
    pub fragment: String,
    /// Read records from this file instead of the project's reference file
    #[arg(long)]
    pub references: Option<String>,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Apply without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
    /// Only report what would change
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,
    /// Read records from this file instead of the project's reference file
    #[arg(long)]
    pub references: Option<String>,
}
