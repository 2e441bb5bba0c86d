use indexmap::IndexMap;

use super::item::{Column, ItemModel, ModelIndex, Value};
use super::node::{NodeId, NodeKind};
use super::notify::{ModelEvent, ModelObserver, Notifier};
use super::tree_model::TreeModel;

/// Row ↔ node map over a [`TreeModel`].
///
/// Row `i` is the `i`-th node of a pre-order walk (plan, its tasks, next
/// plan, ...). The map is rebuilt after every structural change; cell edits
/// are passed through without a rebuild.
#[derive(Debug, Default)]
pub struct FlatModel {
    /// Node → depth, in row order
    rows: IndexMap<NodeId, usize>,
    /// Flat range announced by the last about-to event
    pending: Option<(usize, usize)>,
    notifier: Notifier,
}

impl FlatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Proxy already mapped onto `source`
    pub fn attach(source: &TreeModel) -> Self {
        let mut model = FlatModel::new();
        model.rebuild(source);
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

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Nesting depth of a flat row: 0 for plans, 1 for tasks
    pub fn depth(&self, row: usize) -> Option<usize> {
        self.rows.get_index(row).map(|(_, depth)| *depth)
    }

    pub fn view<'a>(&'a self, source: &'a TreeModel) -> FlatView<'a> {
        FlatView {
            model: self,
            source,
        }
    }

    /// Flat index of a tree index (same column); invalid if unmapped
    pub fn map_from_source(&self, index: &ModelIndex) -> ModelIndex {
        index
            .node()
            .and_then(|node| self.rows.get_index_of(&node).map(|row| (row, node)))
            .map_or(ModelIndex::invalid(), |(row, node)| {
                ModelIndex::new(row, index.column(), node)
            })
    }

    /// Tree index of a flat index (same column); invalid if stale
    pub fn map_to_source(&self, source: &TreeModel, index: &ModelIndex) -> ModelIndex {
        match self.rows.get_index(index.row()) {
            Some((node, _)) if index.node() == Some(*node) => {
                source.index_of(*node, index.column())
            }
            _ => ModelIndex::invalid(),
        }
    }

    fn rebuild(&mut self, source: &TreeModel) {
        self.rows.clear();
        self.collect(source, &ModelIndex::invalid(), 0);
        tracing::debug!(rows = self.rows.len(), "flat map rebuilt");
    }

    fn collect(&mut self, source: &TreeModel, parent: &ModelIndex, depth: usize) {
        for row in 0..source.row_count(parent) {
            let index = source.index(row, 0, parent);
            let Some(node) = index.node() else {
                continue;
            };
            self.rows.insert(node, depth);
            if source.has_children(&index) {
                self.collect(source, &index, depth + 1);
            }
        }
    }

    /// First row after the subtree rooted at `row`
    fn subtree_end(&self, row: usize) -> usize {
        let Some(depth) = self.depth(row) else {
            return row;
        };
        (row + 1..self.rows.len())
            .find(|r| self.depth(*r).is_some_and(|d| d <= depth))
            .unwrap_or(self.rows.len())
    }

    /// Flat rows of the direct children of a tree parent, plus the row just
    /// past the parent's subtree
    fn child_rows(&self, parent: &ModelIndex) -> Option<(Vec<usize>, usize)> {
        let (start, end, depth) = if parent.is_valid() {
            let row = self.rows.get_index_of(&parent.node()?)?;
            let depth = self.depth(row)?;
            (row + 1, self.subtree_end(row), depth + 1)
        } else {
            (0, self.rows.len(), 0)
        };
        let rows = (start..end)
            .filter(|r| self.depth(*r) == Some(depth))
            .collect();
        Some((rows, end))
    }

    /// Where tree rows `first..=last` under `parent` land (or will land)
    fn insertion_range(&self, parent: &ModelIndex, first: usize, last: usize) -> Option<(usize, usize)> {
        let (children, end) = self.child_rows(parent)?;
        let start = match children.get(first) {
            Some(row) => *row,
            None if first == children.len() => end,
            None => return None,
        };
        Some((start, start + (last - first)))
    }

    /// Flat rows occupied by tree rows `first..=last` and their subtrees
    fn removal_range(&self, parent: &ModelIndex, first: usize, last: usize) -> Option<(usize, usize)> {
        let (children, _) = self.child_rows(parent)?;
        let start = *children.get(first)?;
        let end = self.subtree_end(*children.get(last)?);
        Some((start, end - 1))
    }

    /// Follow one tree event: update the map and emit the mapped event
    pub fn source_event(&mut self, source: &TreeModel, event: &ModelEvent) {
        match event {
            ModelEvent::AboutToReset => self.notifier.emit(ModelEvent::AboutToReset),
            ModelEvent::Reset => {
                self.pending = None;
                self.rebuild(source);
                self.notifier.emit(ModelEvent::Reset);
            }
            ModelEvent::LayoutChanged => {
                self.rebuild(source);
                self.notifier.emit(ModelEvent::LayoutChanged);
            }
            ModelEvent::RowsAboutToBeInserted {
                parent,
                first,
                last,
            } => {
                self.pending = self.insertion_range(parent, *first, *last);
                if let Some((first, last)) = self.pending {
                    self.notifier.emit(ModelEvent::RowsAboutToBeInserted {
                        parent: ModelIndex::invalid(),
                        first,
                        last,
                    });
                }
            }
            ModelEvent::RowsInserted { .. } => {
                let before = self.rows.len();
                self.rebuild(source);
                match self.pending.take() {
                    Some((first, last)) if self.rows.len() == before + (last - first + 1) => {
                        self.notifier.emit(ModelEvent::RowsInserted {
                            parent: ModelIndex::invalid(),
                            first,
                            last,
                        });
                    }
                    _ => self.notifier.emit(ModelEvent::LayoutChanged),
                }
            }
            ModelEvent::RowsAboutToBeRemoved {
                parent,
                first,
                last,
            } => {
                self.pending = self.removal_range(parent, *first, *last);
                if let Some((first, last)) = self.pending {
                    self.notifier.emit(ModelEvent::RowsAboutToBeRemoved {
                        parent: ModelIndex::invalid(),
                        first,
                        last,
                    });
                }
            }
            ModelEvent::RowsRemoved { .. } => {
                let before = self.rows.len();
                self.rebuild(source);
                match self.pending.take() {
                    Some((first, last)) if before == self.rows.len() + (last - first + 1) => {
                        self.notifier.emit(ModelEvent::RowsRemoved {
                            parent: ModelIndex::invalid(),
                            first,
                            last,
                        });
                    }
                    _ => self.notifier.emit(ModelEvent::LayoutChanged),
                }
            }
            ModelEvent::DataChanged { index } => {
                let index = self.map_from_source(index);
                if index.is_valid() {
                    self.notifier.emit(ModelEvent::DataChanged { index });
                }
            }
        }
    }
}

/// Read access to a [`FlatModel`] together with the tree it maps
#[derive(Debug, Clone, Copy)]
pub struct FlatView<'a> {
    model: &'a FlatModel,
    source: &'a TreeModel,
}

impl<'a> FlatView<'a> {
    pub fn map_to_source(&self, index: &ModelIndex) -> ModelIndex {
        self.model.map_to_source(self.source, index)
    }

    pub fn map_from_source(&self, index: &ModelIndex) -> ModelIndex {
        self.model.map_from_source(index)
    }

    pub fn depth(&self, row: usize) -> Option<usize> {
        self.model.depth(row)
    }

    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

impl ItemModel for FlatView<'_> {
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column >= Column::COUNT {
            return ModelIndex::invalid();
        }
        self.model
            .rows
            .get_index(row)
            .map_or(ModelIndex::invalid(), |(node, _)| {
                ModelIndex::new(row, column, *node)
            })
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid()
    }

    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() { 0 } else { self.model.len() }
    }

    fn get(&self, index: &ModelIndex, column: usize) -> Option<Value> {
        let source = self.map_to_source(index);
        if !source.is_valid() {
            return None;
        }
        self.source.get(&source, column)
    }

    fn kind(&self, index: &ModelIndex) -> Option<NodeKind> {
        self.source.kind(&self.map_to_source(index))
    }
}
