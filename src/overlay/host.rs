//! Draws the dialog stack over the page and turns clicks into stack
//! operations.
//!
//! The host is the overlay mount point: it renders after the page, over the
//! whole frame, so dialogs are never clipped by the layout of the screen
//! that opened them. Rendering is a projection of the stack; the only
//! mutation the host ever performs goes through
//! [`DialogStack::dismiss_from_backdrop`].

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Clear;

use super::stack::Layer;
use super::{Dialogs, ModalId};
use crate::Theme;
use crate::ui::{DialogEvent, EventResult, Modal};

/// Where a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Inside a dialog's content. Never reaches the backdrop.
    Content(ModalId),
    /// On the backdrop belonging to the given dialog.
    Backdrop(ModalId),
}

/// A dialog as it was drawn in the last frame.
#[derive(Debug, Clone, Copy)]
struct Drawn {
    id: ModalId,
    layer: Layer,
    area: Rect,
}

/// Overlay mount point for the shared dialog stack.
#[derive(Debug, Default)]
pub struct OverlayHost {
    drawn: Vec<Drawn>,
}

impl OverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every open dialog in layer order.
    ///
    /// Only the topmost backdrop is painted: it spans the whole frame and
    /// covers the lower backdrops, dimming the page and every dialog below.
    pub fn render(&mut self, dialogs: &Dialogs, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.drawn.clear();
        dialogs.with_stack(|stack| {
            let depth = stack.count();
            for (index, (layer, entry)) in stack.layered_mut().enumerate() {
                if index + 1 == depth {
                    render_backdrop(frame, area, theme);
                }

                let (width, height) = entry.content().size();
                let content_area = area.centered(width, height);
                frame.render_widget(Clear, content_area);
                entry.content_mut().render(frame, content_area, theme);

                self.drawn.push(Drawn {
                    id: entry.id(),
                    layer,
                    area: content_area,
                });
            }
        });
    }

    /// Attribute a click at `position` to the layer drawn on top of it.
    ///
    /// The topmost backdrop spans the whole frame, so anything outside the
    /// topmost content lands on the topmost backdrop. Uses the layout of the
    /// last rendered frame; a stale attribution is harmless because the
    /// stack rejects backdrop dismissals for entries that are not topmost.
    pub fn hit_test(&self, position: Position) -> Option<Hit> {
        let top = self.drawn.iter().max_by_key(|drawn| drawn.layer.content)?;
        if top.area.contains(position) {
            Some(Hit::Content(top.id))
        } else {
            Some(Hit::Backdrop(top.id))
        }
    }

    /// Handle a mouse event while dialogs are open.
    ///
    /// Returns `Ignored` when no dialog is open so the page can use the
    /// event. Otherwise every mouse event is consumed; a left click on a
    /// dismissable topmost backdrop closes that dialog and reports it as
    /// [`DialogEvent::Dismissed`] so the owner can forget about it.
    pub fn handle_mouse(
        &self,
        dialogs: &Dialogs,
        mouse: MouseEvent,
    ) -> EventResult<(ModalId, DialogEvent)> {
        if !dialogs.is_open() {
            return EventResult::Ignored;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return EventResult::Consumed;
        }

        match self.hit_test(Position::new(mouse.column, mouse.row)) {
            Some(Hit::Backdrop(id)) if dialogs.dismiss_from_backdrop(id) => {
                EventResult::Event((id, DialogEvent::Dismissed))
            }
            Some(Hit::Backdrop(_) | Hit::Content(_)) | None => EventResult::Consumed,
        }
    }
}

fn render_backdrop(frame: &mut Frame, area: Rect, theme: &Theme) {
    frame.buffer_mut().set_style(
        area,
        Style::default()
            .fg(theme.backdrop())
            .add_modifier(Modifier::DIM),
    );
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Constraint;

    use super::*;
    use crate::overlay::ModalOptions;
    use crate::ui::Result;

    struct Filler(&'static str, u16, u16);

    impl Modal for Filler {
        fn handle_key(&mut self, _key: KeyEvent) -> Result<EventResult<DialogEvent>> {
            Ok(EventResult::Consumed)
        }

        fn render(&mut self, frame: &mut Frame, area: Rect, _theme: &Theme) {
            let row = self.0.repeat(usize::from(area.width));
            for y in area.top()..area.bottom() {
                frame.buffer_mut().set_string(area.x, y, &row, Style::default());
            }
        }

        fn size(&self) -> (Constraint, Constraint) {
            (Constraint::Length(self.1), Constraint::Length(self.2))
        }
    }

    fn draw(host: &mut OverlayHost, dialogs: &Dialogs) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                host.render(dialogs, frame, area, &Theme::default());
            })
            .unwrap();
        terminal
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_topmost_is_drawn_last() {
        let dialogs = Dialogs::default();
        dialogs.open(Filler("A", 20, 6));
        dialogs.open(Filler("B", 20, 6));

        let mut host = OverlayHost::new();
        let terminal = draw(&mut host, &dialogs);

        assert_eq!(terminal.backend().buffer()[(40, 12)].symbol(), "B");
    }

    #[test]
    fn test_topmost_backdrop_dims_everything_below() {
        let dialogs = Dialogs::default();
        dialogs.open(Filler("A", 30, 10));
        dialogs.open(Filler("B", 20, 6));

        let mut host = OverlayHost::new();
        let terminal = draw(&mut host, &dialogs);
        let buffer = terminal.backend().buffer();

        // Page, lower dialog, then topmost dialog.
        assert!(buffer[(0, 0)].modifier.contains(Modifier::DIM));
        assert_eq!(buffer[(26, 8)].symbol(), "A");
        assert!(buffer[(26, 8)].modifier.contains(Modifier::DIM));
        assert_eq!(buffer[(40, 12)].symbol(), "B");
        assert!(!buffer[(40, 12)].modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_hit_test_content_and_backdrop() {
        let dialogs = Dialogs::default();
        let id = dialogs.open(Filler("A", 20, 6));

        let mut host = OverlayHost::new();
        draw(&mut host, &dialogs);

        assert_eq!(host.hit_test(Position::new(40, 12)), Some(Hit::Content(id)));
        assert_eq!(host.hit_test(Position::new(0, 0)), Some(Hit::Backdrop(id)));
    }

    #[test]
    fn test_content_click_never_dismisses() {
        let dialogs = Dialogs::default();
        dialogs.open(Filler("A", 20, 6));

        let mut host = OverlayHost::new();
        draw(&mut host, &dialogs);

        assert_eq!(host.handle_mouse(&dialogs, left_click(40, 12)), EventResult::Consumed);
        assert_eq!(dialogs.count(), 1);
    }

    #[test]
    fn test_backdrop_click_dismisses_topmost() {
        let dialogs = Dialogs::default();
        let a = dialogs.open(Filler("A", 20, 6));
        let b = dialogs.open(Filler("B", 20, 6));

        let mut host = OverlayHost::new();
        draw(&mut host, &dialogs);

        assert_eq!(
            host.handle_mouse(&dialogs, left_click(0, 0)),
            EventResult::Event((b, DialogEvent::Dismissed))
        );
        assert_eq!(dialogs.ids(), vec![a]);
    }

    #[test]
    fn test_backdrop_click_respects_prevent_close() {
        let dialogs = Dialogs::default();
        dialogs.open_with(Filler("A", 20, 6), ModalOptions::prevent_backdrop_close());

        let mut host = OverlayHost::new();
        draw(&mut host, &dialogs);

        assert_eq!(host.handle_mouse(&dialogs, left_click(0, 0)), EventResult::Consumed);
        assert_eq!(dialogs.count(), 1);
    }

    #[test]
    fn test_stale_layout_cannot_dismiss_lower_dialog() {
        let dialogs = Dialogs::default();
        let a = dialogs.open(Filler("A", 20, 6));
        let b = dialogs.open(Filler("B", 20, 6));

        let mut host = OverlayHost::new();
        draw(&mut host, &dialogs);
        dialogs.close(Some(b));
        let c = dialogs.open(Filler("C", 20, 6));

        // The last frame still attributes the click to B, which is gone.
        assert_eq!(host.handle_mouse(&dialogs, left_click(0, 0)), EventResult::Consumed);
        assert_eq!(dialogs.ids(), vec![a, c]);
    }

    #[test]
    fn test_mouse_ignored_without_dialogs() {
        let dialogs = Dialogs::default();
        let host = OverlayHost::new();
        assert_eq!(host.handle_mouse(&dialogs, left_click(0, 0)), EventResult::Ignored);
    }
}
