use std::fmt;

use serde::Serialize;

use crate::model::reference::{RecordKind, ReferenceSet};
use crate::view::item::{Column, ItemModel, ModelEditor, ModelIndex, Value};
use crate::view::node::NodeKind;

/// Asks the user whether to go ahead
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAction {
    /// Write the record's display name into TEXT
    Rename,
    /// Clear a LINK that matches no record or several
    Break,
}

/// One queued cell write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub kind: RecordKind,
    pub action: LinkAction,
    /// Cell to write (TEXT for renames, LINK for breaks)
    pub index: ModelIndex,
    pub current: String,
    pub value: String,
}

/// Counts per category of queued edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub ancestor_renames: usize,
    pub source_renames: usize,
    pub ancestor_breaks: usize,
    pub source_breaks: usize,
}

impl UpdateSummary {
    pub fn total(&self) -> usize {
        self.ancestor_renames + self.source_renames + self.ancestor_breaks + self.source_breaks
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for UpdateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Values in the reference file have changed:")?;
        let lines = [
            (self.ancestor_renames, "ancestor name changes"),
            (self.source_renames, "source name changes"),
            (self.ancestor_breaks, "ancestor links broken"),
            (self.source_breaks, "source links broken"),
        ];
        for (count, label) in lines {
            if count > 0 {
                writeln!(f, "  • {} {}", count, label)?;
            }
        }
        write!(f, "Update the project from the reference file?")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The queue was empty; nobody was asked
    NothingToDo,
    Declined { discarded: usize },
    Applied { written: usize },
}

/// Queue of link corrections between a scan and a commit.
///
/// A scan classifies every linked row: a pointer with exactly one matching
/// record whose display name differs from the row's text is queued for a
/// rename; a pointer with zero or several matches is queued to be unlinked.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdater {
    pending: Vec<PendingEdit>,
}

impl LinkUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PendingEdit] {
        &self.pending
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Compare every linked plan (against individuals) and task (against
    /// sources) in a tree-shaped `model`. Replaces whatever was queued.
    pub fn scan(&mut self, model: &dyn ItemModel, references: &ReferenceSet) -> UpdateSummary {
        self.pending.clear();
        let top = ModelIndex::invalid();
        for plan_row in 0..model.row_count(&top) {
            let plan = model.index(plan_row, 0, &top);
            if model.kind(&plan) != Some(NodeKind::Plan) {
                continue;
            }
            self.check(model, &plan, RecordKind::Individual, references);
            for task_row in 0..model.row_count(&plan) {
                let task = model.index(task_row, 0, &plan);
                self.check(model, &task, RecordKind::Source, references);
            }
        }
        let summary = self.summary();
        tracing::debug!(?summary, "link scan finished");
        summary
    }

    fn check(
        &mut self,
        model: &dyn ItemModel,
        index: &ModelIndex,
        kind: RecordKind,
        references: &ReferenceSet,
    ) {
        let link = model.text(index, Column::Link);
        if link.is_empty() {
            return;
        }
        let matches = references.lookup(kind, &link);
        if matches.len() != 1 {
            self.pending.push(PendingEdit {
                kind,
                action: LinkAction::Break,
                index: index.sibling_at_column(Column::Link.index()),
                current: link,
                value: String::new(),
            });
            return;
        }
        let text = model.text(index, Column::Text);
        if matches[0].display_name != text {
            self.pending.push(PendingEdit {
                kind,
                action: LinkAction::Rename,
                index: index.sibling_at_column(Column::Text.index()),
                current: text,
                value: matches[0].display_name.clone(),
            });
        }
    }

    pub fn summary(&self) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        for edit in &self.pending {
            let count = match (edit.kind, edit.action) {
                (RecordKind::Individual, LinkAction::Rename) => &mut summary.ancestor_renames,
                (RecordKind::Source, LinkAction::Rename) => &mut summary.source_renames,
                (RecordKind::Individual, LinkAction::Break) => &mut summary.ancestor_breaks,
                (RecordKind::Source, LinkAction::Break) => &mut summary.source_breaks,
            };
            *count += 1;
        }
        summary
    }

    /// Ask for confirmation and, if given, write every queued edit through
    /// `editor`. The queue is empty afterwards either way.
    pub fn commit(
        &mut self,
        editor: &mut dyn ModelEditor,
        confirm: &mut dyn Confirm,
    ) -> CommitOutcome {
        if self.pending.is_empty() {
            return CommitOutcome::NothingToDo;
        }
        let message = self.summary().to_string();
        let pending = std::mem::take(&mut self.pending);
        if !confirm.confirm(&message) {
            tracing::info!(discarded = pending.len(), "link corrections declined");
            return CommitOutcome::Declined {
                discarded: pending.len(),
            };
        }
        let mut written = 0;
        for edit in pending {
            if editor.set_data(&edit.index, edit.index.column(), Value::Text(edit.value)) {
                written += 1;
            }
        }
        tracing::info!(written, "link corrections applied");
        CommitOutcome::Applied { written }
    }
}

/// Link a plan (to an individual) or task (to a source): LINK takes the
/// pointer and TEXT the record's display name. False unless exactly one
/// record carries the pointer.
pub fn link_record(
    editor: &mut dyn ModelEditor,
    index: &ModelIndex,
    kind: RecordKind,
    pointer: &str,
    references: &ReferenceSet,
) -> bool {
    let matches = references.lookup(kind, pointer);
    let [record] = matches.as_slice() else {
        return false;
    };
    editor.set_data(
        index,
        Column::Link.index(),
        Value::Text(record.pointer.clone()),
    ) && editor.set_data(
        index,
        Column::Text.index(),
        Value::Text(record.display_name.clone()),
    )
}

/// Clear a row's LINK, keeping its text
pub fn unlink_record(editor: &mut dyn ModelEditor, index: &ModelIndex) -> bool {
    editor.set_data(index, Column::Link.index(), Value::Text(String::new()))
}

/// Which reference list a row links into
pub fn record_kind(kind: NodeKind) -> Option<RecordKind> {
    match kind {
        NodeKind::Plan => Some(RecordKind::Individual),
        NodeKind::Task => Some(RecordKind::Source),
        NodeKind::Plans => None,
    }
}
