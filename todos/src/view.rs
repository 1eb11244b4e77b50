//! Plain-text rendering of the derived views

use std::fmt::Write;

use crate::filters::StatusFilter;
use crate::model::{Item, AVAILABLE_COLORS};
use crate::selectors::{TodoSelectors, TotalCountArgs};
use crate::state::AppState;

/// `item` or `items`.
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        "item"
    } else {
        "items"
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One line for an item: `[x] #1 Learn Rust (green)`.
pub fn item_line(item: &Item) -> String {
    let check = if item.completed { 'x' } else { ' ' };
    match &item.color {
        Some(color) => format!("[{}] #{} {} ({})", check, item.id, item.text, color),
        None => format!("[{}] #{} {}", check, item.id, item.text),
    }
}

/// The filtered list, or a loader line while loading.
pub fn render_list(state: &AppState, selectors: &mut TodoSelectors) -> String {
    if state.todos.is_loading() {
        return "Loading...".to_string();
    }

    let items = selectors.filtered_items(state);
    if items.is_empty() {
        return "(nothing to show)".to_string();
    }
    items
        .iter()
        .map(|item| item_line(item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Counts plus the current status and color filters.
pub fn render_footer(state: &AppState, selectors: &mut TodoSelectors) -> String {
    let total = selectors.total_count(state, &TotalCountArgs { max: Some(5) });
    let showing = selectors.filtered_count(state);
    let remaining = selectors.remaining_count(state);

    let mut out = String::new();
    let _ = writeln!(out, "Total: {} {}", total, plural(total));
    let _ = writeln!(out, "Showing: {} {}", showing, plural(showing));
    let _ = writeln!(out, "Remaining Todos: {} {}", remaining, plural(remaining));

    let statuses: Vec<String> = StatusFilter::ALL
        .iter()
        .map(|status| {
            if *status == state.filters.status {
                format!("[{}]", status.label())
            } else {
                status.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "Filter by Status: {}", statuses.join(" "));

    let colors: Vec<String> = AVAILABLE_COLORS
        .iter()
        .map(|color| {
            let check = if state.filters.has_color(color) { 'x' } else { ' ' };
            format!("[{}] {}", check, capitalize(color))
        })
        .collect();
    let _ = write!(out, "Filter by Color: {}", colors.join(" "));
    out
}

/// List followed by footer.
pub fn render(state: &AppState, selectors: &mut TodoSelectors) -> String {
    format!(
        "{}\n\n{}",
        render_list(state, selectors),
        render_footer(state, selectors)
    )
}
