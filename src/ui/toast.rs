use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::Component;
use crate::Theme;

const TOAST_HEIGHT: u16 = 3;
const TOAST_SPACING: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
}

pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Info)
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Short-lived notifications in the bottom-right corner.
///
/// Toasts are not dialogs: they never take input and are drawn under the
/// dialog stack.
pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.toasts.len()
    }
}

impl Component for ToastManager {
    type Output = ();

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let toast_width = 50u16.min(area.width.saturating_sub(4));

        // Stack toasts from bottom-right, going upward
        for (i, toast) in self.toasts.iter().enumerate() {
            let index = u16::try_from(i).unwrap_or(u16::MAX);
            let y_offset = index.saturating_mul(TOAST_HEIGHT + TOAST_SPACING);
            let Some(y) = area
                .bottom()
                .checked_sub(TOAST_HEIGHT + y_offset + 1)
                .filter(|y| *y >= area.y)
            else {
                break;
            };
            let x = area.x + area.width.saturating_sub(toast_width + 2);
            let toast_area = Rect::new(x, y, toast_width, TOAST_HEIGHT);

            let (border_color, icon) = match toast.toast_type {
                ToastType::Success => (theme.success(), "✓"),
                ToastType::Info => (theme.info(), "ℹ"),
            };

            frame.render_widget(Clear, toast_area);

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(theme.surface0()));

            let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
                .style(
                    Style::default()
                        .fg(theme.text())
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center)
                .block(block);

            frame.render_widget(paragraph, toast_area);
        }
    }

    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_only_latest_toasts() {
        let mut toasts = ToastManager::new();
        for i in 0..5 {
            toasts.show(Toast::info(format!("toast {i}")));
        }
        assert_eq!(toasts.len(), 3);
        assert_eq!(toasts.toasts.front().unwrap().message, "toast 2");
    }
}
