//! The command record: one notebook cell plus its last run outcome.

use serde::{Deserialize, Serialize};

/// Primary key of a stored command.
pub type CommandId = i64;

/// Id carried by a record that has never been saved. The store mints a real
/// id on the first write.
pub const SENTINEL_ID: CommandId = 0;

/// Exit code recorded when a process could not be started or its exit
/// status could not be read.
pub const NO_EXIT_CODE: i32 = -1;

// ════════════════════════════════════════════════════════════════════
// Status
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unset,
    Running,
    Success,
    Failed,
}

impl Status {
    /// Text stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unset => "",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failed => "failed",
        }
    }

    /// Decode the `status` column. Returns `None` for text this build does
    /// not know about.
    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "" => Some(Status::Unset),
            "running" => Some(Status::Running),
            "success" => Some(Status::Success),
            "failed" => Some(Status::Failed),
            _ => None,
        }
    }

    pub fn from_exit_code(code: i32) -> Status {
        if code == 0 {
            Status::Success
        } else {
            Status::Failed
        }
    }

    /// `true` once a run has reported back.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Failed)
    }
}

// ════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub text: String,
    pub status: Status,
    /// Meaningful only when `status` is terminal.
    pub return_code: i32,
}

impl Command {
    /// A fresh, unsaved record.
    pub fn draft(text: impl Into<String>) -> Self {
        Self {
            id: SENTINEL_ID,
            text: normalize_text(&text.into()),
            status: Status::Unset,
            return_code: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != SENTINEL_ID
    }

    /// Copy of this record with its text replaced. Every other field is
    /// carried over, since the store always overwrites the full row.
    pub fn with_text(&self, text: &str) -> Self {
        Self {
            text: normalize_text(text),
            ..self.clone()
        }
    }
}

/// Strip the trailing carriage-return/newline run from a command.
pub fn normalize_text(text: &str) -> String {
    text.trim_end_matches(['\r', '\n']).to_string()
}
