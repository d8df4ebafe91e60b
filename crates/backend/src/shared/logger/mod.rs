pub mod classify;
pub mod pagination;
pub mod repository;
pub mod statistics;
pub mod store;

pub use classify::ClassificationRules;
pub use store::{LevelFilter, LogStore, StoreError, StoreErrorKind};
