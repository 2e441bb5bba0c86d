use crate::model::project::Project;

use super::item::{Column, ItemModel, ModelEditor, ModelIndex, Value};
use super::node::{Element, ElementMut, NodeId, NodeKind, NodeTree};
use super::notify::{ModelEvent, ModelObserver, Notifier};

/// Tree model over an optional project: plans at the top level, tasks below.
///
/// Owns the project while it is loaded. All edits go through [`TreeModel::set`],
/// [`TreeModel::add_node`] and [`TreeModel::delete_node`] so that every
/// change is announced to observers.
#[derive(Debug, Default)]
pub struct TreeModel {
    project: Option<Project>,
    nodes: NodeTree,
    notifier: Notifier,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(project: Project) -> Self {
        let mut model = TreeModel::new();
        model.set_project(Some(project));
        model
    }

    pub fn subscribe(&mut self, observer: Box<dyn ModelObserver>) {
        self.notifier.subscribe(observer);
    }

    pub(crate) fn record_events(&mut self, on: bool) {
        self.notifier.set_recording(on);
    }

    pub(crate) fn take_events(&mut self) -> Vec<ModelEvent> {
        self.notifier.take_recorded()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Swap the document (or unload it with `None`). Always a full reset.
    pub fn set_project(&mut self, project: Option<Project>) {
        self.notifier.emit(ModelEvent::AboutToReset);
        self.project = project;
        self.nodes.rebuild(self.project.as_ref());
        self.notifier.emit(ModelEvent::Reset);
    }

    /// Hand the document back, leaving the model empty
    pub fn take_project(&mut self) -> Option<Project> {
        self.notifier.emit(ModelEvent::AboutToReset);
        let project = self.project.take();
        self.nodes.rebuild(None);
        self.notifier.emit(ModelEvent::Reset);
        project
    }

    /// The live node behind a valid index
    pub fn node_id(&self, index: &ModelIndex) -> Option<NodeId> {
        index
            .node()
            .filter(|id| self.nodes.contains(*id) && Some(*id) != self.nodes.root())
    }

    /// Current index of a node; invalid for the root and stale ids
    pub fn index_of(&self, node: NodeId, column: usize) -> ModelIndex {
        if Some(node) == self.nodes.root() {
            return ModelIndex::invalid();
        }
        match self.nodes.position(node) {
            Some(row) => ModelIndex::new(row, column, node),
            None => ModelIndex::invalid(),
        }
    }

    /// The node `parent` stands for, the root when it is invalid
    fn owner(&self, parent: &ModelIndex) -> Option<NodeId> {
        if parent.is_valid() {
            self.node_id(parent)
        } else {
            self.nodes.root()
        }
    }

    fn element(&self, id: NodeId) -> Option<Element<'_>> {
        self.nodes.element(self.project.as_ref()?, id)
    }

    /// Completion state of a row, or of the whole project for an invalid index
    pub fn is_complete(&self, index: &ModelIndex) -> bool {
        self.owner(index)
            .and_then(|id| self.element(id))
            .is_some_and(|e| e.is_complete())
    }

    /// Edit one cell.
    ///
    /// Returns false without touching anything for the ancestor column,
    /// unknown columns, invalid indices and values of the wrong type.
    /// Observers only hear about edits that changed the stored value.
    pub fn set(&mut self, index: &ModelIndex, column: usize, value: Value) -> bool {
        let Some(target) = Column::from_index(column) else {
            return false;
        };
        if !target.is_editable() {
            return false;
        }
        let Some(id) = self.node_id(index) else {
            return false;
        };
        let before = self.get(index, column);

        let Some(project) = self.project.as_mut() else {
            return false;
        };
        let Some(mut element) = self.nodes.element_mut(project, id) else {
            return false;
        };
        if !apply(&mut element, target, value) {
            return false;
        }

        if self.get(index, column) != before {
            self.notifier.emit(ModelEvent::DataChanged {
                index: self.index_of(id, column),
            });
            if target == Column::Text && self.nodes.kind(id) == Some(NodeKind::Plan) {
                for child in self.nodes.children(id).to_vec() {
                    let index = self.index_of(child, Column::Ancestor.index());
                    self.notifier.emit(ModelEvent::DataChanged { index });
                }
            }
        }
        true
    }

    /// Delete the plan or task at `index` along with everything under it
    pub fn delete_node(&mut self, index: &ModelIndex) {
        let Some(id) = self.node_id(index) else {
            return;
        };
        let (Some(parent_id), Some(row)) = (self.nodes.parent(id), self.nodes.position(id)) else {
            return;
        };
        let parent = self.index_of(parent_id, 0);

        self.notifier.emit(ModelEvent::RowsAboutToBeRemoved {
            parent,
            first: row,
            last: row,
        });
        if let Some(project) = self.project.as_mut() {
            self.nodes.delete_child(project, parent_id, row);
        }
        self.notifier.emit(ModelEvent::RowsRemoved {
            parent,
            first: row,
            last: row,
        });
    }

    /// Append a child: a plan for the invalid index, a task for a plan.
    ///
    /// Returns the new row's index. Tasks take no children, so adding under a
    /// task (or with no project loaded) does nothing and returns an invalid index.
    pub fn add_node(&mut self, parent: &ModelIndex) -> ModelIndex {
        if self.project.is_none() {
            return ModelIndex::invalid();
        }
        let Some(target) = self.owner(parent) else {
            return ModelIndex::invalid();
        };
        if self.nodes.kind(target) == Some(NodeKind::Task) {
            return ModelIndex::invalid();
        }
        let row = self.nodes.children(target).len();
        let parent = self.index_of(target, 0);

        self.notifier.emit(ModelEvent::RowsAboutToBeInserted {
            parent,
            first: row,
            last: row,
        });
        let created = match self.project.as_mut() {
            Some(project) => self.nodes.create_child(project, target),
            None => None,
        };
        self.notifier.emit(ModelEvent::RowsInserted {
            parent,
            first: row,
            last: row,
        });

        created.map_or(ModelIndex::invalid(), |id| self.index_of(id, 0))
    }
}

/// Write `value` into the element's `column`; false on a type mismatch
fn apply(element: &mut ElementMut<'_>, column: Column, value: Value) -> bool {
    match (column, value) {
        (Column::Text, Value::Text(s)) => element.set_text(s),
        (Column::Description, Value::Text(s)) => element.set_description(s),
        (Column::Link, Value::Text(s)) => element.set_link(s),
        (Column::Result, Value::Result(r)) => element.set_result(r),
        _ => return false,
    }
    true
}

impl ItemModel for TreeModel {
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= Column::COUNT {
            return ModelIndex::invalid();
        }
        self.owner(parent)
            .and_then(|id| self.nodes.child(id, row))
            .map_or(ModelIndex::invalid(), |child| {
                ModelIndex::new(row, column, child)
            })
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        self.node_id(index)
            .and_then(|id| self.nodes.parent(id))
            .map_or(ModelIndex::invalid(), |parent| self.index_of(parent, 0))
    }

    fn row_count(&self, parent: &ModelIndex) -> usize {
        self.owner(parent)
            .map_or(0, |id| self.nodes.children(id).len())
    }

    fn get(&self, index: &ModelIndex, column: usize) -> Option<Value> {
        let column = Column::from_index(column)?;
        let element = self.element(self.node_id(index)?)?;
        Some(match column {
            Column::Text => Value::Text(element.text().to_string()),
            Column::Description => Value::Text(element.description().to_string()),
            Column::Result => Value::Result(element.result().cloned()),
            Column::Ancestor => Value::Text(element.ancestor().to_string()),
            Column::Link => Value::Text(element.link().to_string()),
        })
    }

    fn kind(&self, index: &ModelIndex) -> Option<NodeKind> {
        self.nodes.kind(self.node_id(index)?)
    }
}

impl ModelEditor for TreeModel {
    fn set_data(&mut self, index: &ModelIndex, column: usize, value: Value) -> bool {
        self.set(index, column, value)
    }
}
