//! The notebook transition function.
//!
//! `reduce` is pure with respect to the outside world: it mutates the
//! session state it is handed and returns the side effects (writes, runs,
//! quitting) for the engine to carry out. Each mode has its own exhaustive
//! transition table.

use crate::command::{Command, CommandId, Status};
use crate::runner::Completion;

use super::buffer::EditOp;
use super::state::{Focus, Mode, NotebookState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    NewEntry,
    FocusUp,
    FocusDown,
    BeginEdit,
    CommitSave,
    CommitSaveAndRun,
    Cancel,
    Quit,
    /// Keystroke for whichever buffer the current mode edits.
    Edit(EditOp),
    /// A background run reported back.
    RunFinished(Completion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upsert `record`, reload, re-resolve focus; then, if `run`, mark it
    /// running, reload again and dispatch it.
    Save {
        record: Command,
        focus: Focus,
        run: bool,
    },
    /// Persist a finished run's outcome and reload.
    RecordOutcome {
        id: CommandId,
        status: Status,
        return_code: i32,
    },
    Quit,
}

pub fn reduce(state: &mut NotebookState, intent: Intent) -> Vec<Effect> {
    let before = state.mode;
    let effects = match state.mode {
        Mode::View => reduce_view(state, intent),
        Mode::Edit => reduce_edit(state, intent),
        Mode::NewEntry => reduce_new_entry(state, intent),
    };
    if state.mode != before {
        tracing::debug!(from = before.label(), to = state.mode.label(), "mode changed");
    }
    effects
}

// ────────────────────────────────────────────────────────────────
// View
// ────────────────────────────────────────────────────────────────

fn reduce_view(state: &mut NotebookState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::NewEntry => {
            state.focus_before_new = state.focus;
            state.focus = None;
            state.composer.clear();
            state.mode = Mode::NewEntry;
            Vec::new()
        }
        Intent::FocusUp => {
            if let Some(last) = state.commands.len().checked_sub(1) {
                state.focus = Some(match state.focus {
                    None => last,
                    Some(i) => i.saturating_sub(1),
                });
            }
            Vec::new()
        }
        Intent::FocusDown => {
            if let Some(last) = state.commands.len().checked_sub(1) {
                state.focus = Some(match state.focus {
                    None => 0,
                    Some(i) => (i + 1).min(last),
                });
            }
            Vec::new()
        }
        Intent::BeginEdit => {
            if let Some(text) = state.focused().map(|c| c.text.clone()) {
                state.inline.set(&text);
                state.mode = Mode::Edit;
            }
            Vec::new()
        }
        Intent::Quit => vec![Effect::Quit],
        Intent::RunFinished(done) => finish_run(state, done),
        Intent::CommitSave | Intent::CommitSaveAndRun | Intent::Cancel | Intent::Edit(_) => {
            Vec::new()
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Edit
// ────────────────────────────────────────────────────────────────

fn reduce_edit(state: &mut NotebookState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::CommitSave => commit_edit(state, false),
        Intent::CommitSaveAndRun => commit_edit(state, true),
        Intent::Cancel => {
            state.inline.clear();
            state.mode = Mode::View;
            Vec::new()
        }
        Intent::Edit(op) => {
            state.inline.apply(op);
            Vec::new()
        }
        Intent::Quit => vec![Effect::Quit],
        Intent::RunFinished(done) => finish_run(state, done),
        Intent::NewEntry | Intent::FocusUp | Intent::FocusDown | Intent::BeginEdit => Vec::new(),
    }
}

fn commit_edit(state: &mut NotebookState, run: bool) -> Vec<Effect> {
    if state.inline.is_blank() {
        return Vec::new();
    }
    let Some(idx) = state.focus else {
        return Vec::new();
    };
    let Some(current) = state.commands.get(idx) else {
        return Vec::new();
    };

    // Full copy of the loaded row; only the text changes.
    let record = current.with_text(state.inline.text());
    state.inline.clear();
    state.mode = Mode::View;

    vec![Effect::Save {
        record,
        focus: Focus::Pinned(idx),
        run,
    }]
}

// ────────────────────────────────────────────────────────────────
// NewEntry
// ────────────────────────────────────────────────────────────────

fn reduce_new_entry(state: &mut NotebookState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::CommitSaveAndRun => {
            if state.composer.is_blank() {
                return Vec::new();
            }
            let record = Command::draft(state.composer.text());
            state.composer.clear();
            state.focus_before_new = None;
            state.mode = Mode::View;

            vec![Effect::Save {
                record,
                focus: Focus::Saved,
                run: true,
            }]
        }
        Intent::Cancel => {
            state.composer.clear();
            let last = state.commands.len().checked_sub(1);
            state.focus = match (state.focus_before_new.take(), last) {
                (Some(idx), Some(last)) => Some(idx.min(last)),
                _ => None,
            };
            state.mode = Mode::View;
            Vec::new()
        }
        Intent::Edit(op) => {
            state.composer.apply(op);
            Vec::new()
        }
        Intent::Quit => vec![Effect::Quit],
        Intent::RunFinished(done) => finish_run(state, done),
        // A new entry is only ever saved together with a run.
        Intent::CommitSave
        | Intent::NewEntry
        | Intent::FocusUp
        | Intent::FocusDown
        | Intent::BeginEdit => Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────
// Completion (any mode)
// ────────────────────────────────────────────────────────────────

fn finish_run(state: &NotebookState, done: Completion) -> Vec<Effect> {
    if state.position_of(done.id).is_none() {
        tracing::warn!(id = done.id, "completion for a command no longer in the log");
        return Vec::new();
    }
    vec![Effect::RecordOutcome {
        id: done.id,
        status: Status::from_exit_code(done.exit_code),
        return_code: done.exit_code,
    }]
}
