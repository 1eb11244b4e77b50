//! Error types

use crate::model::ItemId;

/// Precondition failures on the item store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("no todo with id {0}")]
    MissingTodo(ItemId),
}

/// Failures talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {status} for {path}")]
    Status { status: u16, path: String },

    #[error("backend is offline")]
    Offline,

    #[error("rejected by backend: {0}")]
    Rejected(String),
}

/// A REPL line that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("`{0}` is not a todo id")]
    InvalidId(String),

    #[error("unknown status `{0}` (all, active, completed)")]
    InvalidStatus(String),

    #[error("unknown color `{0}`")]
    UnknownColor(String),

    #[error("color filters look like +color or -color, got `{0}`")]
    InvalidColorChange(String),
}
