pub mod overview;
pub mod reconcile;
