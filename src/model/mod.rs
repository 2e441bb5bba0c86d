pub mod config;
pub mod plan;
pub mod project;
pub mod reference;
pub mod task;

pub use config::*;
pub use plan::*;
pub use project::*;
pub use reference::*;
pub use task::*;
