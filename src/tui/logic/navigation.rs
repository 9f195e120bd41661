use ratatui::widgets::ListState;

pub fn navigate_up(list_state: &mut ListState) {
    if let Some(current) = list_state.selected() {
        if current > 0 {
            list_state.select(Some(current - 1));
        }
    }
}

pub fn navigate_down(list_state: &mut ListState, max_items: usize) {
    let max = max_items.saturating_sub(1);
    if let Some(current) = list_state.selected() {
        if current < max {
            list_state.select(Some(current + 1));
        }
    }
}

/// Selects the first row, or nothing when the list is empty.
pub fn reset_selection(list_state: &mut ListState, len: usize) {
    list_state.select(if len == 0 { None } else { Some(0) });
}

/// Keeps the selection inside a list that may have shrunk.
pub fn clamp_selection(list_state: &mut ListState, len: usize) {
    match list_state.selected() {
        _ if len == 0 => list_state.select(None),
        Some(current) if current >= len => list_state.select(Some(len - 1)),
        None => list_state.select(Some(0)),
        _ => {}
    }
}
