use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, ListItem};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::theme::{ThemeInfo, available_themes};
use crate::ui::{Component, DialogEvent, EventResult, List, ListEvent, ListRow, Modal, Result};

impl ListRow for ThemeInfo {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(self.name.to_string()).style(Style::default().fg(theme.text()))
    }
}

/// Theme picker dialog. Answers with the chosen theme's name.
pub struct ThemeSelector {
    list: List<ThemeInfo>,
    resolver: Arc<KeyResolver>,
}

impl ThemeSelector {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            list: List::new(available_themes(), Arc::clone(&resolver)),
            resolver,
        }
    }
}

impl Modal for ThemeSelector {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogEvent>> {
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(DialogEvent::Cancelled.into());
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(info)) => {
                DialogEvent::Submitted(info.name.to_string()).into()
            }
            EventResult::Event(ListEvent::Changed(_)) | EventResult::Consumed | EventResult::Ignored => {
                EventResult::Consumed
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Select Theme (Enter to confirm, Esc to cancel) ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.list.render(frame, inner, theme);
    }

    fn size(&self) -> (Constraint, Constraint) {
        (Constraint::Percentage(40), Constraint::Percentage(50))
    }

    fn title(&self) -> Option<&str> {
        Some("Select Theme")
    }
}
