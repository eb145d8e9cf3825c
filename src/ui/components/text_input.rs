use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, DialogEvent, EventResult, Modal, Result};

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Single-line text field.
///
/// Used inline on the login screen and as a dialog on the stack, where it
/// answers with [`DialogEvent::Submitted`] or [`DialogEvent::Cancelled`].
pub struct TextInput {
    label: String,
    value: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    placeholder: Option<String>,
    masked: bool,
    focused: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            masked: false,
            focused: true,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.value.insert(index, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len_chars() {
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let start = self.byte_index(pos);
        let end = self.byte_index(self.cursor);
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len_chars());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len_chars();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            // Tab is left to the parent so forms can move focus.
            (KeyCode::Tab | KeyCode::BackTab, _) => EventResult::Ignored,
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let shown: Vec<char> = if self.masked {
            vec!['*'; self.len_chars()]
        } else {
            self.value.chars().collect()
        };
        let cursor = self.cursor.min(shown.len());
        let before: String = shown[..cursor].iter().collect();
        let under = shown.get(cursor).copied().unwrap_or(' ');
        let after: String = shown.iter().skip(cursor + 1).collect();

        let input_style = Style::default().fg(theme.text());
        let cursor_style = if self.focused {
            Style::default()
                .fg(theme.base())
                .bg(theme.text())
                .add_modifier(Modifier::BOLD)
        } else {
            input_style
        };
        let placeholder_style = Style::default().fg(theme.overlay0());

        let line = match &self.placeholder {
            Some(placeholder) if self.value.is_empty() => Line::from(vec![
                Span::styled(" ", cursor_style),
                Span::styled(placeholder.clone(), placeholder_style),
            ]),
            _ => Line::from(vec![
                Span::styled(before, input_style),
                Span::styled(under.to_string(), cursor_style),
                Span::styled(after, input_style),
            ]),
        };

        let border_color = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

impl Modal for TextInput {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogEvent>> {
        Ok(match Component::handle_key(self, key)? {
            EventResult::Event(TextInputEvent::Submitted(value)) => {
                DialogEvent::Submitted(value).into()
            }
            EventResult::Event(TextInputEvent::Cancelled) => DialogEvent::Cancelled.into(),
            EventResult::Consumed | EventResult::Ignored => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        Component::render(self, frame, area, theme);
    }

    fn size(&self) -> (Constraint, Constraint) {
        (Constraint::Percentage(60), Constraint::Length(3))
    }

    fn title(&self) -> Option<&str> {
        Some(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            Component::handle_key(input, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
    }

    fn key(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) {
        Component::handle_key(input, KeyEvent::new(code, modifiers)).unwrap();
    }

    #[test]
    fn test_typing_and_editing() {
        let mut input = TextInput::new("Title");
        type_str(&mut input, "hello world");
        assert_eq!(input.value(), "hello world");

        key(&mut input, KeyCode::Backspace, KeyModifiers::ALT);
        assert_eq!(input.value(), "hello ");

        key(&mut input, KeyCode::Home, KeyModifiers::NONE);
        key(&mut input, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.value(), "ello ");
    }

    #[test]
    fn test_multibyte_input() {
        let mut input = TextInput::new("Body").with_value("café");
        key(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "caf");
        type_str(&mut input, "é!");
        assert_eq!(input.value(), "café!");
    }

    #[test]
    fn test_modal_events() {
        let mut input = TextInput::new("Retrospect").with_value("done");
        let submitted =
            Modal::handle_key(&mut input, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
                .unwrap();
        assert_eq!(submitted, DialogEvent::Submitted("done".to_string()).into());

        let cancelled =
            Modal::handle_key(&mut input, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
                .unwrap();
        assert_eq!(cancelled, DialogEvent::Cancelled.into());
    }
}
