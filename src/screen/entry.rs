use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListItem, Paragraph, Wrap};

use crate::Theme;
use crate::app::DiaryEvent;
use crate::commands::{AddRetrospectCmd, DeleteRetrospectCmd, LoadEntryCmd, UpdateEntryCmd};
use crate::config::EntryAction;
use crate::diary::{DiaryEntry, EntryId, Retrospect, RetrospectId};
use crate::overlay::{AuthGuard, ModalId};
use crate::screen::{Screen, ScreenContext, ScreenMsg};
use crate::ui::{
    Component, ConfirmDialog, DialogEvent, EventResult, Keybinding, List, ListRow, Result,
    TextInput,
};

impl ListRow for Retrospect {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(Line::from(vec![
            Span::styled(
                self.created_at.format("%Y-%m-%d ").to_string(),
                Style::default().fg(theme.overlay1()),
            ),
            Span::styled(self.body.clone(), Style::default().fg(theme.text())),
        ]))
    }
}

/// One entry with its retrospects.
pub struct EntryScreen {
    ctx: ScreenContext,
    guard: AuthGuard,
    id: EntryId,
    entry: Option<DiaryEntry>,
    retrospects: List<Retrospect>,
    editing: Option<ModalId>,
    adding: Option<ModalId>,
    confirm_delete: Option<(ModalId, RetrospectId)>,
}

impl EntryScreen {
    pub fn new(ctx: ScreenContext, id: EntryId) -> Self {
        Self {
            guard: ctx.auth_guard(),
            retrospects: List::new(Vec::new(), Arc::clone(&ctx.resolver)),
            ctx,
            id,
            entry: None,
            editing: None,
            adding: None,
            confirm_delete: None,
        }
    }

    fn load(&self) -> ScreenMsg {
        LoadEntryCmd::new(Arc::clone(&self.ctx.store), self.id).into()
    }

    fn show(&mut self, entry: DiaryEntry) {
        self.retrospects.set_items(entry.retrospects.clone());
        self.entry = Some(entry);
    }

    fn start_edit(&mut self) {
        let Some(body) = self.entry.as_ref().map(|e| e.body.clone()) else {
            return;
        };
        if !self.guard.check() {
            return;
        }
        let id = self.ctx.dialogs.open(TextInput::new("Edit entry").with_value(body));
        self.editing = Some(id);
    }

    fn start_add_retrospect(&mut self) {
        if self.entry.is_none() || !self.guard.check() {
            return;
        }
        let input = TextInput::new("New retrospect").with_placeholder("Looking back...");
        self.adding = Some(self.ctx.dialogs.open(input));
    }

    fn start_delete_retrospect(&mut self) {
        let Some(retrospect) = self.retrospects.selected().map(|r| r.id) else {
            return;
        };
        if !self.guard.check() {
            return;
        }
        let dialog = ConfirmDialog::new("Delete this retrospect?", Arc::clone(&self.ctx.resolver))
            .with_title("Delete retrospect")
            .with_confirm_text("Delete")
            .danger();
        let id = self.ctx.dialogs.open(dialog);
        self.confirm_delete = Some((id, retrospect));
    }

    fn render_entry(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()));

        let Some(entry) = &self.entry else {
            frame.render_widget(
                Paragraph::new("Loading entry...")
                    .style(Style::default().fg(theme.overlay1()))
                    .block(block),
                area,
            );
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "Written {}  -  last edited {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.updated_at.format("%Y-%m-%d %H:%M")
                ),
                Style::default().fg(theme.overlay1()),
            )),
            Line::default(),
        ];
        lines.extend(entry.body.lines().map(|line| {
            Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text())))
        }));

        let block = block.title(format!(" {} ", entry.title)).title_style(
            Style::default()
                .fg(theme.mauve())
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Screen for EntryScreen {
    fn init(&mut self) -> ScreenMsg {
        self.load()
    }

    fn leave(&mut self) {
        self.guard.reset();
        self.editing = None;
        self.adding = None;
        self.confirm_delete = None;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ScreenMsg>> {
        let resolver = Arc::clone(&self.ctx.resolver);

        if resolver.matches_entry(&key, EntryAction::Edit) {
            self.start_edit();
            return Ok(EventResult::Consumed);
        }
        if resolver.matches_entry(&key, EntryAction::AddRetrospect) {
            self.start_add_retrospect();
            return Ok(EventResult::Consumed);
        }
        if resolver.matches_entry(&key, EntryAction::DeleteRetrospect) {
            self.start_delete_retrospect();
            return Ok(EventResult::Consumed);
        }
        if resolver.matches_entry(&key, EntryAction::Reload) {
            return Ok(self.load().into());
        }

        Ok(match self.retrospects.handle_key(key)? {
            EventResult::Ignored => EventResult::Ignored,
            EventResult::Consumed | EventResult::Event(_) => EventResult::Consumed,
        })
    }

    fn handle_scroll(&mut self, delta: isize) {
        self.retrospects.scroll_by(delta);
    }

    fn handle_dialog(&mut self, id: ModalId, event: DialogEvent) -> Result<EventResult<ScreenMsg>> {
        if self.guard.resolve(id, &event) {
            return Ok(EventResult::Consumed);
        }

        if self.editing == Some(id) {
            self.editing = None;
            self.ctx.dialogs.close(Some(id));
            if let DialogEvent::Submitted(body) = event {
                return Ok(
                    ScreenMsg::from(UpdateEntryCmd::new(Arc::clone(&self.ctx.store), self.id, body))
                        .into(),
                );
            }
            return Ok(EventResult::Consumed);
        }

        if self.adding == Some(id) {
            self.adding = None;
            self.ctx.dialogs.close(Some(id));
            if let DialogEvent::Submitted(body) = event
                && !body.trim().is_empty()
            {
                return Ok(ScreenMsg::from(AddRetrospectCmd::new(
                    Arc::clone(&self.ctx.store),
                    self.id,
                    body,
                ))
                .into());
            }
            return Ok(EventResult::Consumed);
        }

        if let Some((dialog, retrospect)) = self.confirm_delete
            && dialog == id
        {
            self.confirm_delete = None;
            self.ctx.dialogs.close(Some(id));
            if event == DialogEvent::Confirmed {
                return Ok(ScreenMsg::from(DeleteRetrospectCmd::new(
                    Arc::clone(&self.ctx.store),
                    self.id,
                    retrospect,
                ))
                .into());
            }
            return Ok(EventResult::Consumed);
        }

        Ok(EventResult::Ignored)
    }

    fn handle_diary(&mut self, event: DiaryEvent) -> ScreenMsg {
        match event {
            DiaryEvent::EntryLoaded(entry)
            | DiaryEvent::EntryUpdated(entry)
            | DiaryEvent::RetrospectsChanged(entry)
                if entry.id == self.id =>
            {
                self.show(entry);
                ScreenMsg::Idle
            }
            DiaryEvent::EntryDeleted(id) if id == self.id => ScreenMsg::Back,
            _ => ScreenMsg::Idle,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(10)])
            .split(area);

        self.render_entry(frame, chunks[0], theme);

        let block = Block::default()
            .title(format!(" Retrospects ({}) ", self.retrospects.items().len()))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);
        self.retrospects.render(frame, inner, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let title = self
            .entry
            .as_ref()
            .map_or_else(|| self.id.to_string(), |e| e.title.clone());
        vec!["Diary".to_string(), title]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        vec![
            Keybinding::new(resolver.display_entry(EntryAction::Edit), "Edit"),
            Keybinding::new(resolver.display_entry(EntryAction::AddRetrospect), "Retrospect"),
            Keybinding::new(
                resolver.display_entry(EntryAction::DeleteRetrospect),
                "Delete retrospect",
            ),
            Keybinding::hint(resolver.display_entry(EntryAction::Reload), "Reload"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::app::AppMessage;
    use crate::screen::testing;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    /// Execute the commands in `result` and feed their replies back.
    async fn run(
        result: EventResult<ScreenMsg>,
        fixture: &mut testing::Fixture,
        screen: &mut EntryScreen,
    ) {
        if let EventResult::Event(ScreenMsg::Run(commands)) = result {
            for command in commands {
                command.execute(fixture.tx.clone()).await.unwrap();
            }
        }
        while let Ok(message) = fixture.rx.try_recv() {
            if let AppMessage::Diary(event) = message {
                screen.handle_diary(event);
            }
        }
    }

    #[tokio::test]
    async fn test_signed_out_edit_opens_login_prompt() {
        let fixture = testing::fixture(false).await;
        let entry = fixture.ctx.store.create("Monday", "Rained.").await.unwrap();
        let mut screen = EntryScreen::new(fixture.ctx.clone(), entry.id);
        screen.handle_diary(DiaryEvent::EntryLoaded(entry));

        screen.handle_key(key('e')).unwrap();
        screen.handle_key(key('a')).unwrap();

        assert_eq!(fixture.ctx.dialogs.count(), 1);
        assert!(screen.editing.is_none());
        assert!(screen.adding.is_none());
    }

    #[tokio::test]
    async fn test_add_and_delete_retrospect() {
        let mut fixture = testing::fixture(true).await;
        let entry = fixture.ctx.store.create("Exam", "Nervous.").await.unwrap();
        let mut screen = EntryScreen::new(fixture.ctx.clone(), entry.id);
        screen.handle_diary(DiaryEvent::EntryLoaded(entry));

        screen.handle_key(key('a')).unwrap();
        let input = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen
            .handle_dialog(input, DialogEvent::Submitted("It went fine.".to_string()))
            .unwrap();
        assert!(!fixture.ctx.dialogs.is_open());
        run(result, &mut fixture, &mut screen).await;
        assert_eq!(screen.retrospects.items().len(), 1);

        screen.handle_key(key('x')).unwrap();
        let confirm = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen.handle_dialog(confirm, DialogEvent::Confirmed).unwrap();
        run(result, &mut fixture, &mut screen).await;

        assert!(screen.retrospects.items().is_empty());
        assert!(!fixture.ctx.dialogs.is_open());
    }

    #[tokio::test]
    async fn test_edit_replaces_body() {
        let mut fixture = testing::fixture(true).await;
        let entry = fixture.ctx.store.create("Monday", "Rained.").await.unwrap();
        let mut screen = EntryScreen::new(fixture.ctx.clone(), entry.id);
        screen.handle_diary(DiaryEvent::EntryLoaded(entry));

        screen.handle_key(key('e')).unwrap();
        let input = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen
            .handle_dialog(input, DialogEvent::Submitted("Sunny.".to_string()))
            .unwrap();
        run(result, &mut fixture, &mut screen).await;

        assert_eq!(screen.entry.as_ref().map(|e| e.body.as_str()), Some("Sunny."));
    }

    #[tokio::test]
    async fn test_events_for_other_entries_are_ignored() {
        let fixture = testing::fixture(true).await;
        let shown = fixture.ctx.store.create("shown", "").await.unwrap();
        let other = fixture.ctx.store.create("other", "").await.unwrap();
        let mut screen = EntryScreen::new(fixture.ctx.clone(), shown.id);

        screen.handle_diary(DiaryEvent::EntryLoaded(other.clone()));
        assert!(screen.entry.is_none());

        assert!(matches!(
            screen.handle_diary(DiaryEvent::EntryDeleted(other.id)),
            ScreenMsg::Idle
        ));
        assert!(matches!(
            screen.handle_diary(DiaryEvent::EntryDeleted(shown.id)),
            ScreenMsg::Back
        ));
    }
}
