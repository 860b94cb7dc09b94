pub mod command;
pub mod engine;
pub mod notebook;
pub mod runner;
pub mod store;

// Re-export the main struct so users can just use `cahier_core::NotebookEngine`
pub use engine::{EngineError, Flow, NotebookEngine};

// Re-export the simpler types for the UI
pub use command::{Command, CommandId, Status};
pub use notebook::{EditOp, Intent, Mode};
