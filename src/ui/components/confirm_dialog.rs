use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{DialogEvent, EventResult, Modal, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStyle {
    #[default]
    Normal,
    /// Shows red warning styling.
    Danger,
}

/// Two-button dialog answering with [`DialogEvent::Confirmed`] or
/// [`DialogEvent::Cancelled`].
pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    cancel_text: String,
    style: ConfirmStyle,
    busy: Option<String>,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            confirm_text: "Yes".to_string(),
            cancel_text: "No".to_string(),
            style: ConfirmStyle::Normal,
            busy: None,
            resolver,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn with_cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub const fn danger(mut self) -> Self {
        self.style = ConfirmStyle::Danger;
        self
    }

    /// Replace the buttons with a progress line while the owner finishes
    /// the confirmed action.
    pub fn busy(mut self, label: impl Into<String>) -> Self {
        self.busy = Some(label.into());
        self
    }
}

impl Modal for ConfirmDialog {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogEvent>> {
        if self.busy.is_some() {
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(DialogEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(DialogEvent::Cancelled.into());
        }
        // Consume all other keys to prevent propagation
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (title_color, border_color, confirm_color) = match self.style {
            ConfirmStyle::Normal => (theme.mauve(), theme.lavender(), theme.green()),
            ConfirmStyle::Danger => (theme.red(), theme.red(), theme.red()),
        };

        let message_style = Style::default().fg(theme.text());
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let confirm_style = Style::default()
            .fg(confirm_color)
            .add_modifier(Modifier::BOLD);
        let cancel_style = Style::default()
            .fg(theme.overlay1())
            .add_modifier(Modifier::BOLD);

        let actions = self.busy.as_ref().map_or_else(
            || {
                Line::from(vec![
                    Span::styled(
                        format!("[{}]", self.resolver.display_dialog(DialogAction::Confirm)),
                        key_style,
                    ),
                    Span::raw(" "),
                    Span::styled(self.confirm_text.clone(), confirm_style),
                    Span::raw("    "),
                    Span::styled(
                        format!("[{}]", self.resolver.display_dialog(DialogAction::Cancel)),
                        key_style,
                    ),
                    Span::raw(" "),
                    Span::styled(self.cancel_text.clone(), cancel_style),
                ])
            },
            |label| Line::from(Span::styled(label.clone(), cancel_style)),
        );

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), message_style)),
            Line::from(""),
            actions,
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(title_color)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }

    fn size(&self) -> (Constraint, Constraint) {
        (Constraint::Percentage(50), Constraint::Length(7))
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::config::keybindings::KeybindingsConfig;

    fn dialog() -> ConfirmDialog {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        ConfirmDialog::new("Delete?", resolver)
    }

    fn press(dialog: &mut ConfirmDialog, code: KeyCode) -> EventResult<DialogEvent> {
        dialog
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_confirm_and_cancel_keys() {
        let mut dialog = dialog();
        assert_eq!(press(&mut dialog, KeyCode::Char('y')), DialogEvent::Confirmed.into());
        assert_eq!(press(&mut dialog, KeyCode::Esc), DialogEvent::Cancelled.into());
        assert_eq!(press(&mut dialog, KeyCode::Char('x')), EventResult::Consumed);
    }

    #[test]
    fn test_busy_dialog_swallows_keys() {
        let mut dialog = dialog().busy("Deleting...");
        assert_eq!(press(&mut dialog, KeyCode::Char('y')), EventResult::Consumed);
        assert_eq!(press(&mut dialog, KeyCode::Esc), EventResult::Consumed);
    }
}
