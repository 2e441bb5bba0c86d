use std::fmt;

use crate::model::task::TaskResult;

use super::node::{NodeId, NodeKind};

/// The columns every view exposes for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Ancestor name for plans, source citation for tasks
    Text,
    /// Goal for plans, description for tasks
    Description,
    Result,
    /// The owning plan's ancestor (tasks only, never editable)
    Ancestor,
    /// Reference pointer (internal)
    Link,
}

impl Column {
    pub const COUNT: usize = 5;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Text,
        Column::Description,
        Column::Result,
        Column::Ancestor,
        Column::Link,
    ];

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_editable(self) -> bool {
        !matches!(self, Column::Ancestor)
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Text => "Text",
            Column::Description => "Description",
            Column::Result => "Result",
            Column::Ancestor => "Ancestor",
            Column::Link => "Link",
        }
    }
}

/// A cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// `None` is an open task (or a row without results)
    Result(Option<TaskResult>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Result(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s),
            Value::Result(_) => None,
        }
    }

    pub fn into_result(self) -> Option<TaskResult> {
        match self {
            Value::Result(r) => r,
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Result(Some(r)) => write!(f, "{}", r),
            Value::Result(None) => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<TaskResult>> for Value {
    fn from(r: Option<TaskResult>) -> Self {
        Value::Result(r)
    }
}

impl From<TaskResult> for Value {
    fn from(r: TaskResult) -> Self {
        Value::Result(Some(r))
    }
}

/// Address of a cell in one of the views.
///
/// An invalid index doubles as "the top level" when passed as a parent.
/// Indices stay usable across in-place edits; after any reset, insert or
/// remove they must be looked up again (stale ones resolve to nothing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: Option<NodeId>,
}

impl ModelIndex {
    pub const fn invalid() -> Self {
        ModelIndex {
            row: 0,
            column: 0,
            node: None,
        }
    }

    pub(crate) fn new(row: usize, column: usize, node: NodeId) -> Self {
        ModelIndex {
            row,
            column,
            node: Some(node),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// The tree node behind this row, shared by every view of the same element
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn sibling_at_column(&self, column: usize) -> ModelIndex {
        match self.node {
            Some(node) => ModelIndex::new(self.row, column, node),
            None => ModelIndex::invalid(),
        }
    }
}

/// Read access shared by the tree model and its proxies
pub trait ItemModel {
    /// Index of child `row` under `parent`; invalid if out of range
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Parent of `index`; invalid for top-level rows
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    fn row_count(&self, parent: &ModelIndex) -> usize;

    fn column_count(&self) -> usize {
        Column::COUNT
    }

    /// Cell value, or `None` for an invalid index or column
    fn get(&self, index: &ModelIndex, column: usize) -> Option<Value>;

    /// Element type behind a row
    fn kind(&self, index: &ModelIndex) -> Option<NodeKind>;

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Value at the index's own column
    fn data(&self, index: &ModelIndex) -> Option<Value> {
        self.get(index, index.column())
    }

    /// Text of a cell, empty for missing or non-text values
    fn text(&self, index: &ModelIndex, column: Column) -> String {
        self.get(index, column.index())
            .and_then(Value::into_text)
            .unwrap_or_default()
    }

    fn result(&self, index: &ModelIndex) -> Option<TaskResult> {
        self.get(index, Column::Result.index())
            .and_then(Value::into_result)
    }

    fn is_editable(&self, index: &ModelIndex, column: usize) -> bool {
        index.is_valid() && Column::from_index(column).is_some_and(Column::is_editable)
    }
}

/// The single write path into the document: cell edits
pub trait ModelEditor {
    /// Store `value` in a cell. Returns false when the cell cannot take it.
    fn set_data(&mut self, index: &ModelIndex, column: usize, value: Value) -> bool;
}
