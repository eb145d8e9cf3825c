use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};

/// ASCII art logo for the status bar.
const LOGO: &[&str] = &[
    r"   ______________    ",
    r"  /  dear diary /|   ",
    r" /  ~~~~~~~~~~ / |   ",
    r"/_____________/  |   ",
    r"|  (^_^ )     |  /   ",
    r"|  lazydiary  | /    ",
    r"|_____________|/     ",
];

/// A key hint shown in the status bar.
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
    /// Whether the hint is shown in the status bar.
    pub hint: bool,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            hint: false,
        }
    }

    pub fn hint(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            hint: true,
            ..Self::new(key, description)
        }
    }
}

/// What the status bar knows about the running app.
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub username: Option<String>,
    pub breadcrumbs: Vec<String>,
    pub open_dialogs: usize,
    /// Title of the dialog currently taking input.
    pub top_dialog: Option<String>,
}

pub struct StatusBar {
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self { resolver }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        info: &StatusInfo,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(36),
                Constraint::Min(20),
                Constraint::Length(LOGO_WIDTH),
            ])
            .split(inner_area);

        Self::render_status_info(frame, chunks[0], theme, info);
        self.render_keybindings(frame, chunks[1], theme, local_keybindings);
        Self::render_logo(frame, chunks[2], theme);
    }

    fn render_status_info(frame: &mut Frame, area: Rect, theme: &Theme, info: &StatusInfo) {
        let w = area.width as usize;
        let label_style = Style::default().fg(theme.overlay1());
        let value_style = Style::default().fg(theme.text());

        let (user, user_style) = info.username.as_deref().map_or_else(
            || ("not signed in", Style::default().fg(theme.overlay0())),
            |name| {
                (
                    name,
                    Style::default()
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
            },
        );

        let dialogs = match (info.open_dialogs, &info.top_dialog) {
            (0, _) => "none".to_string(),
            (n, Some(title)) => format!("{n} · {title}"),
            (n, None) => n.to_string(),
        };

        let lines = vec![
            Line::from(Span::styled(truncate_str(user, w), user_style)),
            Line::from(""),
            status_line(
                "page",
                &info.breadcrumbs.join(" › "),
                w,
                label_style,
                value_style,
            ),
            status_line("dialogs", &dialogs, w, label_style, value_style),
        ];

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global_keybindings = self.global_keybindings();

        // Local hints first, then global.
        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .filter(|kb| kb.hint)
            .chain(global_keybindings.iter().filter(|kb| kb.hint))
            .collect();

        if hints.is_empty() || area.height == 0 {
            return;
        }

        let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let max_desc_w = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        // key(right-aligned) + " │ " (3) + desc + gap(2)
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = area.height as usize;

        // Fill column by column.
        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows;
            if col_idx >= num_cols {
                break;
            }
            columns[col_idx].push(Line::from(vec![
                Span::styled(
                    format!("{:>width$}", kb.key, width = max_key_w),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface2())),
                Span::styled(
                    kb.description.clone(),
                    Style::default().fg(theme.subtext0()),
                ),
            ]));
        }

        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(col_width); num_cols])
            .split(area);

        for (col_lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(col_lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let logo_lines: Vec<Line> = LOGO
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    *line,
                    Style::default()
                        .fg(theme.mauve())
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();

        frame.render_widget(Paragraph::new(logo_lines), area);
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Theme), "Theme"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Select"),
            Keybinding::new(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::Up),
                    self.resolver.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
        ]
    }
}

const LOGO_WIDTH: u16 = 22;

/// Render a labelled status line: `  label  value` (right-aligned label, then value).
fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    const LABEL_W: usize = 8;
    let available = max_width.saturating_sub(LABEL_W + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate_str(value, available), value_style),
    ])
}

/// Truncate a string to fit within a given width, adding "..." if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("journal", 10), "journal");
        assert_eq!(truncate_str("my long diary title", 10), "my long...");
        assert_eq!(truncate_str("tagebuch", 2), "ta");
        assert_eq!(truncate_str("äöüäöüäöü", 6), "äöü...");
    }
}
