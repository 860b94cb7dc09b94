//! Key map: crossterm key events to notebook intents.
//!
//! `ctrl+d` quits from any mode and is checked first. In the two editing
//! modes the commit/cancel chords are matched before anything reaches the
//! edit buffer.

use cahier_core::notebook::{EditOp, Intent, Mode};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn map_key(mode: Mode, key: KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // ── Global ──
    if ctrl && key.code == KeyCode::Char('d') {
        return Some(Intent::Quit);
    }

    match mode {
        Mode::View => match key.code {
            KeyCode::Char('n') if !ctrl => Some(Intent::NewEntry),
            KeyCode::Up | KeyCode::Char('k') if !ctrl => Some(Intent::FocusUp),
            KeyCode::Down | KeyCode::Char('j') if !ctrl => Some(Intent::FocusDown),
            KeyCode::Enter => Some(Intent::BeginEdit),
            _ => None,
        },

        Mode::Edit | Mode::NewEntry => match key.code {
            KeyCode::Char('s') if ctrl => Some(Intent::CommitSave),
            KeyCode::Char('r') if ctrl => Some(Intent::CommitSaveAndRun),
            KeyCode::Esc => Some(Intent::Cancel),
            _ => edit_op(key).map(Intent::Edit),
        },
    }
}

fn edit_op(key: KeyEvent) -> Option<EditOp> {
    let chorded = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

    match key.code {
        KeyCode::Char(c) if !chorded => Some(EditOp::Insert(c)),
        KeyCode::Enter => Some(EditOp::Newline),
        KeyCode::Backspace => Some(EditOp::Backspace),
        KeyCode::Delete => Some(EditOp::Delete),
        KeyCode::Left => Some(EditOp::Left),
        KeyCode::Right => Some(EditOp::Right),
        KeyCode::Home => Some(EditOp::Home),
        KeyCode::End => Some(EditOp::End),
        _ => None,
    }
}
