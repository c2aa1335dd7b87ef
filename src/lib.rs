// tasktrack - Personal task tracker backed by a local SQLite file

pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, StoreError, ValidationError};
pub use models::{Task, TaskStatus};
pub use store::Store;
