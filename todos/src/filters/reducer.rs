use super::{ColorChange, FiltersAction, FiltersState};

/// Filter store reducer. Returns `true` if the state changed.
pub fn reducer(state: &mut FiltersState, action: FiltersAction) -> bool {
    match action {
        FiltersAction::SetStatus(status) => {
            if state.status == status {
                return false;
            }
            state.status = status;
            true
        }

        FiltersAction::ChangeColor {
            color,
            change: ColorChange::Added,
        } => {
            if state.has_color(&color) {
                return false;
            }
            state.colors.push(color);
            true
        }

        FiltersAction::ChangeColor {
            color,
            change: ColorChange::Removed,
        } => {
            if !state.has_color(&color) {
                return false;
            }
            state.colors.retain(|existing| *existing != color);
            true
        }
    }
}

/// Pure form of [`reducer`].
pub fn reduce(state: &FiltersState, action: FiltersAction) -> FiltersState {
    let mut next = state.clone();
    reducer(&mut next, action);
    next
}
