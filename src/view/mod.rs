pub mod filter_model;
pub mod flat_model;
pub mod item;
pub mod node;
pub mod notify;
pub mod task_filter;
pub mod tree_model;
pub mod workspace;

pub use filter_model::{FilterModel, FilterView};
pub use flat_model::{FlatModel, FlatView};
pub use item::{Column, ItemModel, ModelEditor, ModelIndex, Value};
pub use node::{NodeId, NodeKind, NodeTree};
pub use notify::{EventLog, ModelEvent, ModelObserver, Notifier};
pub use task_filter::{ResultFilter, TaskFilter};
pub use tree_model::TreeModel;
pub use workspace::Workspace;
