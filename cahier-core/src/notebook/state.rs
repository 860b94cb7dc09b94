//! Session state threaded through the reducer.

use crate::command::{Command, CommandId};

use super::buffer::EditBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Browsing the log.
    View,
    /// Editing an already persisted record in place.
    Edit,
    /// Composing a brand-new record.
    NewEntry,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::View, Mode::Edit, Mode::NewEntry];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::View => "view",
            Mode::Edit => "edit",
            Mode::NewEntry => "new",
        }
    }
}

/// Where focus lands after the log is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Keep this index, clamped to the reloaded list.
    Pinned(usize),
    /// The record that was just written.
    Saved,
}

#[derive(Debug, Clone)]
pub struct NotebookState {
    pub(crate) mode: Mode,
    pub(crate) commands: Vec<Command>,
    pub(crate) focus: Option<usize>,
    /// Focus held before `NewEntry` cleared it, restored on cancel.
    pub(crate) focus_before_new: Option<usize>,
    pub(crate) inline: EditBuffer,
    pub(crate) composer: EditBuffer,
}

impl NotebookState {
    /// Initial state: `View`, focused on the last record if there is one.
    pub fn new(commands: Vec<Command>) -> Self {
        let focus = commands.len().checked_sub(1);
        Self {
            mode: Mode::View,
            commands,
            focus,
            focus_before_new: None,
            inline: EditBuffer::new(),
            composer: EditBuffer::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Focused index, `None` when nothing is focused.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn focused(&self) -> Option<&Command> {
        self.focus.and_then(|i| self.commands.get(i))
    }

    pub fn position_of(&self, id: CommandId) -> Option<usize> {
        self.commands.iter().position(|c| c.id == id)
    }

    /// The buffer for the current mode. `None` in `View`.
    pub fn active_buffer(&self) -> Option<&EditBuffer> {
        match self.mode {
            Mode::View => None,
            Mode::Edit => Some(&self.inline),
            Mode::NewEntry => Some(&self.composer),
        }
    }

    pub(crate) fn active_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match self.mode {
            Mode::View => None,
            Mode::Edit => Some(&mut self.inline),
            Mode::NewEntry => Some(&mut self.composer),
        }
    }

    /// Swap in a freshly loaded log and re-resolve focus. `saved` is the id
    /// of the record the triggering write touched.
    pub fn refresh(&mut self, commands: Vec<Command>, focus: Focus, saved: CommandId) {
        self.commands = commands;
        let last = self.commands.len().checked_sub(1);
        self.focus = match focus {
            Focus::Pinned(idx) => last.map(|last| idx.min(last)),
            Focus::Saved => self.position_of(saved).or(last),
        };
    }

    /// Swap in a freshly loaded log, keeping the current focus in range.
    pub fn reload(&mut self, commands: Vec<Command>) {
        self.commands = commands;
        let last = self.commands.len().checked_sub(1);
        self.focus = match (self.focus, last) {
            (Some(idx), Some(last)) => Some(idx.min(last)),
            _ => None,
        };
    }
}
