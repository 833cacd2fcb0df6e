// Selectable list state shared by the dashboard tabs.
// Keeps the displayed items while a refresh is in flight so stale data stays visible.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

/// Status of the most recent fetch for a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadingState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// State for a selectable list with keyboard navigation.
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    pub items: Vec<T>,
    pub list_state: ListState,
    pub state: LoadingState,
    /// Capture time of the displayed items.
    pub captured_at: Option<DateTime<Utc>>,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
            state: LoadingState::Idle,
            captured_at: None,
        }
    }
}

impl<T> SelectableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all items wholesale, keeping the selection in range.
    pub fn replace(&mut self, items: Vec<T>, captured_at: DateTime<Utc>) {
        self.items = items;
        self.captured_at = Some(captured_at);
        self.state = LoadingState::Loaded;
        self.clamp_selection();
    }

    /// Record a failed refresh. Existing items stay displayed.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = LoadingState::Error(message.into());
    }

    pub fn start_loading(&mut self) {
        self.state = LoadingState::Loading;
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.items.len(), self.list_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    /// Get the currently selected index.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Get the currently selected item.
    pub fn selected_item(&self) -> Option<&T> {
        self.selected().and_then(|i| self.items.get(i))
    }

    /// Select the next item in the list.
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= self.items.len() - 1 => i, // Stay at end
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item in the list.
    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_selects_first_item() {
        let mut list = SelectableList::new();
        list.replace(vec!["a", "b"], Utc::now());

        assert_eq!(list.selected_item(), Some(&"a"));
        assert_eq!(list.state, LoadingState::Loaded);
    }

    #[test]
    fn test_replace_clamps_selection() {
        let mut list = SelectableList::new();
        list.replace(vec![1, 2, 3], Utc::now());
        list.select_next();
        list.select_next();
        assert_eq!(list.selected(), Some(2));

        list.replace(vec![1], Utc::now());
        assert_eq!(list.selected(), Some(0));

        list.replace(Vec::new(), Utc::now());
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_fail_keeps_items() {
        let mut list = SelectableList::new();
        list.replace(vec!["kept"], Utc::now());
        list.start_loading();
        list.fail("boom");

        assert_eq!(list.items, vec!["kept"]);
        assert_eq!(list.state.error(), Some("boom"));
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut list = SelectableList::new();
        list.select_next();
        assert_eq!(list.selected(), None);

        list.replace(vec![1, 2], Utc::now());
        list.select_prev();
        assert_eq!(list.selected(), Some(0));
        list.select_next();
        list.select_next();
        assert_eq!(list.selected(), Some(1));
    }
}
