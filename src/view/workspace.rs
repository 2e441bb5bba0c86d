use std::path::Path;

use crate::io::reference_io::{ReferenceError, ReferenceLoader};
use crate::model::project::Project;
use crate::model::reference::ReferenceSet;

use super::filter_model::{FilterModel, FilterView};
use super::flat_model::{FlatModel, FlatView};
use super::item::{ModelEditor, ModelIndex, Value};
use super::notify::ModelObserver;
use super::task_filter::TaskFilter;
use super::tree_model::TreeModel;

/// The three stacked views of one project, kept in step.
///
/// The tree model is the only layer that touches the document. Its events
/// are relayed to the flattening proxy, whose own events are relayed to the
/// filter proxy.
#[derive(Debug)]
pub struct Workspace {
    tree: TreeModel,
    flat: FlatModel,
    tasks: FilterModel,
    references: ReferenceSet,
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new(TaskFilter::default())
    }
}

impl Workspace {
    pub fn new(filter: TaskFilter) -> Self {
        let mut tree = TreeModel::new();
        tree.record_events(true);
        let mut flat = FlatModel::attach(&tree);
        flat.record_events(true);
        let tasks = FilterModel::attach(&flat.view(&tree), filter);
        Workspace {
            tree,
            flat,
            tasks,
            references: ReferenceSet::default(),
        }
    }

    pub fn with_project(project: Project, filter: TaskFilter) -> Self {
        let mut workspace = Workspace::new(filter);
        workspace.set_project(Some(project));
        workspace
    }

    /// Pass pending tree events down the chain
    fn relay(&mut self) {
        for event in self.tree.take_events() {
            self.flat.source_event(&self.tree, &event);
            for flat_event in self.flat.take_events() {
                self.tasks
                    .source_event(&self.flat.view(&self.tree), &flat_event);
            }
        }
    }

    pub fn project(&self) -> Option<&Project> {
        self.tree.project()
    }

    pub fn set_project(&mut self, project: Option<Project>) {
        self.tree.set_project(project);
        self.relay();
    }

    pub fn take_project(&mut self) -> Option<Project> {
        let project = self.tree.take_project();
        self.relay();
        project
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    /// The flattened list of plans and tasks
    pub fn flat(&self) -> FlatView<'_> {
        self.flat.view(&self.tree)
    }

    /// The filtered task list
    pub fn tasks(&self) -> FilterView<'_, FlatView<'_>> {
        self.tasks.view(self.flat())
    }

    pub fn subscribe_tree(&mut self, observer: Box<dyn ModelObserver>) {
        self.tree.subscribe(observer);
    }

    pub fn subscribe_flat(&mut self, observer: Box<dyn ModelObserver>) {
        self.flat.subscribe(observer);
    }

    pub fn subscribe_tasks(&mut self, observer: Box<dyn ModelObserver>) {
        self.tasks.subscribe(observer);
    }

    /// Edit a cell through a tree index
    pub fn set(&mut self, index: &ModelIndex, column: usize, value: Value) -> bool {
        let changed = self.tree.set(index, column, value);
        self.relay();
        changed
    }

    pub fn add_node(&mut self, parent: &ModelIndex) -> ModelIndex {
        let index = self.tree.add_node(parent);
        self.relay();
        index
    }

    pub fn delete_node(&mut self, index: &ModelIndex) {
        self.tree.delete_node(index);
        self.relay();
    }

    pub fn filter(&self) -> &TaskFilter {
        self.tasks.filter()
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        let source = self.flat.view(&self.tree);
        self.tasks.set_filter(&source, filter);
    }

    pub fn set_text_filter(&mut self, text: &str) {
        let source = self.flat.view(&self.tree);
        self.tasks.set_text_filter(&source, text);
    }

    pub fn set_result_filter(&mut self, result: &str) {
        let source = self.flat.view(&self.tree);
        self.tasks.set_result_filter(&source, result);
    }

    pub fn set_ancestor_filter(&mut self, ancestor: &str) {
        let source = self.flat.view(&self.tree);
        self.tasks.set_ancestor_filter(&source, ancestor);
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Replace the loaded reference records wholesale
    pub fn set_references(&mut self, references: ReferenceSet) {
        self.references = references;
    }

    /// Load reference records from `path`. On failure the previously loaded
    /// records stay in place.
    pub fn load_references(
        &mut self,
        loader: &dyn ReferenceLoader,
        path: &Path,
    ) -> Result<(), ReferenceError> {
        match loader.load(path) {
            Ok(references) => {
                tracing::info!(
                    path = %path.display(),
                    individuals = references.individuals.len(),
                    sources = references.sources.len(),
                    "reference file loaded"
                );
                self.references = references;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "reference file not loaded");
                Err(e)
            }
        }
    }
}

impl ModelEditor for Workspace {
    fn set_data(&mut self, index: &ModelIndex, column: usize, value: Value) -> bool {
        self.set(index, column, value)
    }
}
