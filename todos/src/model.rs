//! Records shared by the stores, the network client and the views

use std::fmt;

use serde::{Deserialize, Serialize};

/// Colors an item can be tagged with.
pub const AVAILABLE_COLORS: [&str; 5] = ["green", "blue", "orange", "purple", "red"];

/// Whether `color` is one of [`AVAILABLE_COLORS`].
pub fn is_available_color(color: &str) -> bool {
    AVAILABLE_COLORS.contains(&color)
}

/// Identifier assigned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A to-do item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Item {
    /// An active, uncolored item.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            text: text.into(),
            completed: false,
            color: None,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Payload for creating an item; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,
}

impl NewTodo {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
