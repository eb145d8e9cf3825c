use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListItem, Paragraph, Wrap};
use tracing::debug;

use crate::Theme;
use crate::app::{DiaryEvent, Route};
use crate::commands::{CreateEntryCmd, DeleteEntryCmd, LoadEntriesCmd, SignOutCmd};
use crate::config::DiaryAction;
use crate::diary::{DiaryEntry, EntryId};
use crate::overlay::{AuthGuard, ModalId, ModalOptions};
use crate::screen::{Screen, ScreenContext, ScreenMsg};
use crate::ui::{
    Component, ConfirmDialog, DialogEvent, EventResult, Keybinding, List, ListEvent, ListRow,
    Result, TextInput,
};

impl ListRow for DiaryEntry {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(Line::from(vec![
            Span::styled(
                self.created_at.format("%Y-%m-%d ").to_string(),
                Style::default().fg(theme.overlay1()),
            ),
            Span::styled(self.title.clone(), Style::default().fg(theme.text())),
            Span::styled(
                format!("  {}", self.summary()),
                Style::default().fg(theme.overlay0()),
            ),
        ]))
    }
}

/// Creating an entry asks for the title first, then the body.
enum CreateStep {
    Title(ModalId),
    Body { dialog: ModalId, title: String },
}

/// The list of all entries with a preview of the selected one.
pub struct DiaryListScreen {
    ctx: ScreenContext,
    guard: AuthGuard,
    list: List<DiaryEntry>,
    loading: bool,
    create: Option<CreateStep>,
    confirm_delete: Option<(ModalId, EntryId)>,
    /// Busy dialog shown until the delete command reports back.
    deleting: Option<(ModalId, EntryId)>,
}

impl DiaryListScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            guard: ctx.auth_guard(),
            list: List::new(Vec::new(), Arc::clone(&ctx.resolver)),
            loading: false,
            create: None,
            confirm_delete: None,
            deleting: None,
            ctx,
        }
    }

    fn reload(&mut self) -> ScreenMsg {
        self.loading = true;
        LoadEntriesCmd::new(Arc::clone(&self.ctx.store)).into()
    }

    fn start_create(&mut self) {
        if !self.guard.check() {
            return;
        }
        let id = self
            .ctx
            .dialogs
            .open(TextInput::new("New entry - title").with_placeholder("What happened today?"));
        self.create = Some(CreateStep::Title(id));
    }

    fn start_delete(&mut self) {
        let Some(entry) = self.list.selected() else {
            return;
        };
        let (entry_id, title) = (entry.id, entry.title.clone());
        if !self.guard.check() {
            return;
        }

        let dialog = ConfirmDialog::new(
            format!("Delete '{title}'? This cannot be undone."),
            Arc::clone(&self.ctx.resolver),
        )
        .with_title("Delete entry")
        .with_confirm_text("Delete")
        .danger();
        let id = self.ctx.dialogs.open(dialog);
        self.confirm_delete = Some((id, entry_id));
    }

    fn finish_delete(&mut self, entry: EntryId) -> ScreenMsg {
        let busy = ConfirmDialog::new("Deleting entry...", Arc::clone(&self.ctx.resolver))
            .with_title("Delete entry")
            .danger()
            .busy("Deleting...");
        let id = self
            .ctx
            .dialogs
            .open_with(busy, ModalOptions::prevent_backdrop_close());
        self.deleting = Some((id, entry));
        DeleteEntryCmd::new(Arc::clone(&self.ctx.store), entry).into()
    }

    fn handle_create_answer(&mut self, step: CreateStep, event: DialogEvent) -> ScreenMsg {
        match (step, event) {
            (CreateStep::Title(dialog), DialogEvent::Submitted(title)) if !title.trim().is_empty() => {
                self.ctx.dialogs.close(Some(dialog));
                let body = TextInput::new(format!("{} - body", title.trim()))
                    .with_placeholder("Write it down...");
                let dialog = self.ctx.dialogs.open(body);
                self.create = Some(CreateStep::Body { dialog, title });
                ScreenMsg::Idle
            }
            (CreateStep::Title(dialog), DialogEvent::Submitted(_)) => {
                // Leave the title dialog open so the user can fix it.
                self.create = Some(CreateStep::Title(dialog));
                ScreenMsg::Notify("An entry needs a title".to_string())
            }
            (CreateStep::Body { dialog, title }, DialogEvent::Submitted(body)) => {
                self.ctx.dialogs.close(Some(dialog));
                CreateEntryCmd::new(Arc::clone(&self.ctx.store), title, body).into()
            }
            (CreateStep::Title(dialog) | CreateStep::Body { dialog, .. }, _) => {
                self.ctx.dialogs.close(Some(dialog));
                ScreenMsg::Idle
            }
        }
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Preview ")
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));

        let Some(entry) = self.list.selected() else {
            frame.render_widget(block, area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                entry.title.clone(),
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Written {}  -  {} retrospect(s)",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.retrospects.len()
                ),
                Style::default().fg(theme.overlay1()),
            )),
            Line::default(),
        ];
        lines.extend(
            entry
                .body
                .lines()
                .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text())))),
        );

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Screen for DiaryListScreen {
    fn init(&mut self) -> ScreenMsg {
        self.reload()
    }

    fn leave(&mut self) {
        self.guard.reset();
        self.create = None;
        self.confirm_delete = None;
        self.deleting = None;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ScreenMsg>> {
        let resolver = Arc::clone(&self.ctx.resolver);

        if resolver.matches_diary(&key, DiaryAction::New) {
            self.start_create();
            return Ok(EventResult::Consumed);
        }
        if resolver.matches_diary(&key, DiaryAction::Delete) {
            self.start_delete();
            return Ok(EventResult::Consumed);
        }
        if resolver.matches_diary(&key, DiaryAction::Reload) {
            return Ok(self.reload().into());
        }
        if resolver.matches_diary(&key, DiaryAction::Login) {
            return Ok(ScreenMsg::Navigate(Route::Login).into());
        }
        if resolver.matches_diary(&key, DiaryAction::Logout) {
            return Ok(ScreenMsg::from(SignOutCmd::new(Arc::clone(&self.ctx.sessions))).into());
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(entry)) => {
                ScreenMsg::Navigate(Route::Entry(entry.id)).into()
            }
            EventResult::Event(ListEvent::Changed(_)) | EventResult::Consumed => {
                EventResult::Consumed
            }
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn handle_scroll(&mut self, delta: isize) {
        self.list.scroll_by(delta);
    }

    fn handle_dialog(&mut self, id: ModalId, event: DialogEvent) -> Result<EventResult<ScreenMsg>> {
        if self.guard.resolve(id, &event) {
            return Ok(EventResult::Consumed);
        }

        if let Some((dialog, entry)) = self.confirm_delete
            && dialog == id
        {
            self.confirm_delete = None;
            self.ctx.dialogs.close(Some(dialog));
            if event == DialogEvent::Confirmed {
                return Ok(self.finish_delete(entry).into());
            }
            return Ok(EventResult::Consumed);
        }

        match self.create.take() {
            Some(step @ (CreateStep::Title(dialog) | CreateStep::Body { dialog, .. }))
                if dialog == id =>
            {
                Ok(self.handle_create_answer(step, event).into())
            }
            other => {
                self.create = other;
                Ok(EventResult::Ignored)
            }
        }
    }

    fn handle_diary(&mut self, event: DiaryEvent) -> ScreenMsg {
        match event {
            DiaryEvent::EntriesLoaded(entries) => {
                self.loading = false;
                self.list.set_items(entries);
                ScreenMsg::Idle
            }
            DiaryEvent::EntryCreated(_) => self.reload(),
            DiaryEvent::EntryDeleted(deleted) => {
                if let Some((dialog, entry)) = self.deleting
                    && entry == deleted
                {
                    debug!(%dialog, %entry, "Delete finished, closing busy dialog");
                    self.ctx.dialogs.close(Some(dialog));
                    self.deleting = None;
                }
                self.reload()
            }
            DiaryEvent::EntryLoaded(_)
            | DiaryEvent::EntryUpdated(_)
            | DiaryEvent::RetrospectsChanged(_) => ScreenMsg::Idle,
        }
    }

    fn command_failed(&mut self) {
        self.loading = false;
        if let Some((dialog, _)) = self.deleting.take() {
            self.ctx.dialogs.close(Some(dialog));
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let block = Block::default()
            .title(format!(" Entries ({}) ", self.list.items().len()))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()));
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);

        if self.list.items().is_empty() {
            let message = if self.loading {
                "Loading entries...".to_string()
            } else {
                format!(
                    "No entries yet. Press {} to write one.",
                    self.ctx.resolver.display_diary(DiaryAction::New)
                )
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(theme.overlay1()))
                    .wrap(Wrap { trim: true }),
                inner,
            );
        } else {
            self.list.render(frame, inner, theme);
        }

        self.render_preview(frame, chunks[1], theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Diary".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        vec![
            Keybinding::new(resolver.display_diary(DiaryAction::New), "New"),
            Keybinding::new(resolver.display_diary(DiaryAction::Delete), "Delete"),
            Keybinding::new(resolver.display_diary(DiaryAction::Reload), "Reload"),
            Keybinding::hint(resolver.display_diary(DiaryAction::Login), "Log in"),
            Keybinding::hint(resolver.display_diary(DiaryAction::Logout), "Log out"),
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

    #[tokio::test]
    async fn test_signed_out_create_prompts_once() {
        let fixture = testing::fixture(false).await;
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());

        screen.handle_key(key('n')).unwrap();
        screen.handle_key(key('n')).unwrap();

        assert_eq!(fixture.ctx.dialogs.count(), 1);
        assert!(screen.guard.state().prompt_shown);
        assert!(screen.create.is_none());
    }

    #[tokio::test]
    async fn test_confirming_login_prompt_navigates() {
        let mut fixture = testing::fixture(false).await;
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());

        screen.handle_key(key('n')).unwrap();
        let prompt = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen.handle_dialog(prompt, DialogEvent::Confirmed).unwrap();

        assert!(matches!(result, EventResult::Consumed));
        assert!(!fixture.ctx.dialogs.is_open());
        assert!(matches!(
            fixture.rx.try_recv(),
            Ok(AppMessage::Navigate(Route::Login))
        ));
    }

    #[tokio::test]
    async fn test_create_asks_title_then_body() {
        let fixture = testing::fixture(true).await;
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());

        screen.handle_key(key('n')).unwrap();
        let title = fixture.ctx.dialogs.top_id().unwrap();
        screen
            .handle_dialog(title, DialogEvent::Submitted("Monday".to_string()))
            .unwrap();

        let body = fixture.ctx.dialogs.top_id().unwrap();
        assert_ne!(body, title);
        assert_eq!(fixture.ctx.dialogs.count(), 1);

        let result = screen
            .handle_dialog(body, DialogEvent::Submitted("Rained.".to_string()))
            .unwrap();
        assert!(matches!(result, EventResult::Event(ScreenMsg::Run(_))));
        assert!(!fixture.ctx.dialogs.is_open());
    }

    #[tokio::test]
    async fn test_blank_title_keeps_title_dialog_open() {
        let fixture = testing::fixture(true).await;
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());

        screen.handle_key(key('n')).unwrap();
        let title = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen
            .handle_dialog(title, DialogEvent::Submitted("   ".to_string()))
            .unwrap();

        assert!(matches!(result, EventResult::Event(ScreenMsg::Notify(_))));
        assert_eq!(fixture.ctx.dialogs.ids(), vec![title]);
        assert!(matches!(screen.create, Some(CreateStep::Title(id)) if id == title));

        // A real title still moves on to the body.
        screen
            .handle_dialog(title, DialogEvent::Submitted("Monday".to_string()))
            .unwrap();
        assert!(matches!(screen.create, Some(CreateStep::Body { .. })));
    }

    #[tokio::test]
    async fn test_delete_flow_closes_busy_dialog_when_done() {
        let mut fixture = testing::fixture(true).await;
        let entry = fixture.ctx.store.create("Monday", "").await.unwrap();
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());
        screen.handle_diary(DiaryEvent::EntriesLoaded(vec![entry.clone()]));

        screen.handle_key(key('d')).unwrap();
        let confirm = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen.handle_dialog(confirm, DialogEvent::Confirmed).unwrap();

        // The confirm dialog is replaced by a busy one while the command runs.
        assert_eq!(fixture.ctx.dialogs.count(), 1);
        assert_ne!(fixture.ctx.dialogs.top_id(), Some(confirm));

        let EventResult::Event(ScreenMsg::Run(commands)) = result else {
            panic!("expected a delete command");
        };
        for command in commands {
            command.execute(fixture.tx.clone()).await.unwrap();
        }

        let mut reloaded = false;
        while let Ok(message) = fixture.rx.try_recv() {
            if let AppMessage::Diary(event) = message {
                reloaded |= matches!(screen.handle_diary(event), ScreenMsg::Run(_));
            }
        }

        assert!(reloaded);
        assert!(!fixture.ctx.dialogs.is_open());
        assert!(fixture.ctx.store.get(entry.id).await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_delete_keeps_entry() {
        let fixture = testing::fixture(true).await;
        let entry = fixture.ctx.store.create("Monday", "").await.unwrap();
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());
        screen.handle_diary(DiaryEvent::EntriesLoaded(vec![entry]));

        screen.handle_key(key('d')).unwrap();
        let confirm = fixture.ctx.dialogs.top_id().unwrap();
        let result = screen.handle_dialog(confirm, DialogEvent::Cancelled).unwrap();

        assert!(matches!(result, EventResult::Consumed));
        assert!(!fixture.ctx.dialogs.is_open());
        assert!(screen.deleting.is_none());
    }

    #[tokio::test]
    async fn test_leave_resets_guard() {
        let fixture = testing::fixture(false).await;
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());
        screen.handle_key(key('n')).unwrap();

        screen.leave();

        assert!(!screen.guard.state().prompt_shown);
        assert!(!fixture.ctx.dialogs.is_open());
    }

    #[tokio::test]
    async fn test_scroll_moves_selection() {
        let fixture = testing::fixture(true).await;
        let first = fixture.ctx.store.create("one", "").await.unwrap();
        let second = fixture.ctx.store.create("two", "").await.unwrap();
        let mut screen = DiaryListScreen::new(fixture.ctx.clone());
        screen.handle_diary(DiaryEvent::EntriesLoaded(vec![second, first.clone()]));

        screen.handle_scroll(3);

        assert_eq!(screen.list.selected().map(|e| e.id), Some(first.id));
    }
}
