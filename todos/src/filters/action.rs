use todo_dispatch::Action;

use super::StatusFilter;

/// Direction of a color filter change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorChange {
    Added,
    Removed,
}

impl ColorChange {
    /// Parse `added` or `removed`. Anything else yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added" => Some(ColorChange::Added),
            "removed" => Some(ColorChange::Removed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorChange::Added => "added",
            ColorChange::Removed => "removed",
        }
    }
}

/// Actions owned by the filter store.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(namespace = "filters")]
pub enum FiltersAction {
    SetStatus(StatusFilter),
    ChangeColor { color: String, change: ColorChange },
}

impl FiltersAction {
    /// Build a color change from its textual change type.
    ///
    /// Returns `None` for an unknown change type, so nothing is dispatched.
    pub fn change_color(color: impl Into<String>, change: &str) -> Option<Self> {
        ColorChange::parse(change).map(|change| FiltersAction::ChangeColor {
            color: color.into(),
            change,
        })
    }
}
