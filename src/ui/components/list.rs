use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            resolver,
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Move the selection by `delta` rows, clamped to the list.
    pub fn scroll_by(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let last = self.items.len() - 1;
        let next = current.saturating_add_signed(delta).min(last);
        self.state.select(Some(next));
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        EventResult::Consumed
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let before = self.state.selected();

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.scroll_by(1);
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.scroll_by(-1);
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select_first();
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            if !self.items.is_empty() {
                self.state.select(Some(self.items.len() - 1));
            }
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.scroll_by(PAGE_STEP.cast_signed());
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.scroll_by(-PAGE_STEP.cast_signed());
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            if let Some(item) = self.selected() {
                return Ok(ListEvent::Activated(item.clone()).into());
            }
            return Ok(EventResult::Ignored);
        }

        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::config::keybindings::KeybindingsConfig;

    #[derive(Clone, Debug, PartialEq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }
    }

    fn list(rows: &[&'static str]) -> List<Row> {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        List::new(rows.iter().copied().map(Row).collect(), resolver)
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut list = list(&["a", "b", "c"]);
        list.scroll_by(10);
        assert_eq!(list.selected(), Some(&Row("c")));
        list.scroll_by(-10);
        assert_eq!(list.selected(), Some(&Row("a")));
    }

    #[test]
    fn test_select_activates_current_row() {
        let mut list = list(&["a", "b"]);
        list.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE))
            .unwrap();
        let result = list
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert!(matches!(result, EventResult::Event(ListEvent::Activated(Row("b")))));
    }

    #[test]
    fn test_set_items_keeps_selection_in_bounds() {
        let mut list = list(&["a", "b", "c"]);
        list.scroll_by(2);
        list.set_items(vec![Row("a")]);
        assert_eq!(list.selected(), Some(&Row("a")));
        list.set_items(vec![]);
        assert_eq!(list.selected(), None);
    }
}
