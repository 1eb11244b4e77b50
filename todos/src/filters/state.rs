use std::fmt;

use crate::model::Item;

/// Completion filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    /// Parse `all`, `active` or `completed` (any case).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "completed" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }

    /// Whether an item with this completion passes.
    pub fn admits(&self, completed: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !completed,
            StatusFilter::Completed => completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        })
    }
}

/// State of the filter store.
///
/// `colors` holds no duplicates. Order follows insertion and does not
/// affect filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FiltersState {
    pub status: StatusFilter,
    pub colors: Vec<String>,
}

impl FiltersState {
    /// True when no filter narrows the list.
    pub fn shows_everything(&self) -> bool {
        self.status == StatusFilter::All && self.colors.is_empty()
    }

    /// Same filter with `colors` sorted, so equal color sets compare equal.
    pub fn normalized(&self) -> FiltersState {
        let mut colors = self.colors.clone();
        colors.sort_unstable();
        FiltersState {
            status: self.status,
            colors,
        }
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Whether `item` passes both the status and the color filter.
    ///
    /// With colors selected, an uncolored item never passes.
    pub fn matches(&self, item: &Item) -> bool {
        let color_matches = self.colors.is_empty()
            || item.color.as_deref().is_some_and(|color| self.has_color(color));
        self.status.admits(item.completed) && color_matches
    }
}
