//! Notebook session: modes, focus, edit buffers, and the reducer that moves
//! between them.

pub mod buffer;
pub mod reducer;
pub mod state;

pub use buffer::{EditBuffer, EditOp};
pub use reducer::{reduce, Effect, Intent};
pub use state::{Focus, Mode, NotebookState};
