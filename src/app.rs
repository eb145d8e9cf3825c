use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::commands::Command;
use crate::config::{self, GlobalAction, KeyResolver};
use crate::diary::{DiaryEntry, DiaryStore, EntryId};
use crate::overlay::{Dialogs, ModalId, Navigator, OverlayHost, ScrollLock};
use crate::screen::{DiaryListScreen, EntryScreen, LoginScreen, Screen, ScreenContext, ScreenMsg};
use crate::session::SessionStore;
use crate::theme::theme_from_name;
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, DialogEvent, ErrorDialog, EventResult, StatusBar, StatusInfo, ThemeSelector, Toast,
    ToastManager, ToastType,
};

const FRAME_RATE: f64 = 60.0;
const TICK_RATE: f64 = 4.0;
const STATUS_BAR_HEIGHT: u16 = 6;
const SCROLL_STEP: isize = 3;

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Diary,
    Entry(EntryId),
    Login,
}

/// Results reported by diary commands.
#[derive(Debug)]
pub enum DiaryEvent {
    EntriesLoaded(Vec<DiaryEntry>),
    EntryLoaded(DiaryEntry),
    EntryCreated(DiaryEntry),
    EntryUpdated(DiaryEntry),
    EntryDeleted(EntryId),
    RetrospectsChanged(DiaryEntry),
}

/// Messages sent to the App from commands and from the login guard.
#[derive(Debug)]
pub enum AppMessage {
    Navigate(Route),
    Diary(DiaryEvent),
    SignedIn { username: String },
    SignedOut,
    ShowToast { message: String, toast_type: ToastType },
    CommandFailed { name: String, error: String },
}

impl From<DiaryEvent> for AppMessage {
    fn from(event: DiaryEvent) -> Self {
        Self::Diary(event)
    }
}

/// Sends the App to the login page.
#[derive(Debug, Clone)]
pub struct AppNavigator {
    tx: UnboundedSender<AppMessage>,
}

impl AppNavigator {
    pub const fn new(tx: UnboundedSender<AppMessage>) -> Self {
        Self { tx }
    }
}

impl Navigator for AppNavigator {
    fn go_to_login(&self) {
        let _ = self.tx.send(AppMessage::Navigate(Route::Login));
    }
}

pub struct App {
    ctx: ScreenContext,
    resolver: Arc<KeyResolver>,
    theme: Theme,

    route: Route,
    /// Where to go once the login screen is done.
    return_route: Route,
    screen: Box<dyn Screen>,

    dialogs: Dialogs,
    host: OverlayHost,
    theme_selector: Option<ModalId>,
    error_dialogs: Vec<ModalId>,

    toasts: ToastManager,
    status_bar: StatusBar,
    username: Option<String>,

    should_quit: bool,
    should_suspend: bool,
    action_tx: UnboundedSender<AppMessage>,
    action_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        resolver: Arc<KeyResolver>,
        theme: Theme,
        store: Arc<DiaryStore>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let dialogs = Dialogs::new(ScrollLock::new());

        let username = match sessions.current() {
            Ok(session) => session.map(|s| s.username),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable session");
                None
            }
        };

        let ctx = ScreenContext {
            dialogs: dialogs.clone(),
            resolver: Arc::clone(&resolver),
            store,
            sessions,
            navigator: Arc::new(AppNavigator::new(action_tx.clone())),
        };

        Self {
            screen: Box::new(DiaryListScreen::new(ctx.clone())),
            ctx,
            status_bar: StatusBar::new(Arc::clone(&resolver)),
            resolver,
            theme,
            route: Route::Diary,
            return_route: Route::Diary,
            dialogs,
            host: OverlayHost::new(),
            theme_selector: None,
            error_dialogs: Vec::new(),
            toasts: ToastManager::new(),
            username,
            should_quit: false,
            should_suspend: false,
            action_tx,
            action_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        let init = self.screen.init();
        self.handle_screen_msg(init);

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages();
            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        // Releases the page scroll lock before the terminal is restored.
        self.dialogs.close_all();
        tui.exit()?;
        info!("Exiting lazydiary");
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            self.should_quit = true;
            return Ok(());
        };

        let result = match event {
            Event::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Event::Tick => {
                self.toasts.handle_tick();
                Ok(())
            }
            Event::Render => return self.render(tui),
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                return self.render(tui);
            }
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Error(error) => {
                warn!(%error, "Terminal event error");
                Ok(())
            }
        };

        if let Err(err) = result {
            self.show_error(format!("{err:#}"));
        }
        Ok(())
    }

    /// Dialogs first, then the page, then global keys.
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.dialogs.handle_key(key)? {
            EventResult::Event((id, event)) => return self.handle_dialog(id, event),
            EventResult::Consumed => return Ok(()),
            EventResult::Ignored => {}
        }

        match self.screen.handle_key(key)? {
            EventResult::Event(msg) => {
                self.handle_screen_msg(msg);
                return Ok(());
            }
            EventResult::Consumed => return Ok(()),
            EventResult::Ignored => {}
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Theme) {
            let id = self
                .dialogs
                .open(ThemeSelector::new(Arc::clone(&self.resolver)));
            self.theme_selector = Some(id);
        } else if self.resolver.matches_global(&key, GlobalAction::Back) {
            self.go_back();
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match self.host.handle_mouse(&self.dialogs, mouse) {
            EventResult::Event((id, event)) => return self.handle_dialog(id, event),
            EventResult::Consumed => return Ok(()),
            EventResult::Ignored => {}
        }

        if self.dialogs.scroll_lock().is_locked() {
            return Ok(());
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => self.screen.handle_scroll(SCROLL_STEP),
            MouseEventKind::ScrollUp => self.screen.handle_scroll(-SCROLL_STEP),
            _ => {}
        }
        Ok(())
    }

    fn handle_dialog(&mut self, id: ModalId, event: DialogEvent) -> Result<()> {
        debug!(%id, ?event, "Dialog answered");

        if self.theme_selector == Some(id) {
            self.theme_selector = None;
            self.dialogs.close(Some(id));
            if let DialogEvent::Submitted(name) = event {
                self.apply_theme(&name);
            }
            return Ok(());
        }

        if let Some(index) = self.error_dialogs.iter().position(|e| *e == id) {
            self.error_dialogs.remove(index);
            self.dialogs.close(Some(id));
            return Ok(());
        }

        match self.screen.handle_dialog(id, event)? {
            EventResult::Event(msg) => self.handle_screen_msg(msg),
            EventResult::Consumed => {}
            EventResult::Ignored => {
                warn!(%id, "Dialog answered without an owner, closing it");
                self.dialogs.close(Some(id));
            }
        }
        Ok(())
    }

    fn handle_screen_msg(&mut self, msg: ScreenMsg) {
        match msg {
            ScreenMsg::Idle => {}
            ScreenMsg::Run(commands) => {
                for command in commands {
                    self.spawn(command);
                }
            }
            ScreenMsg::Navigate(route) => self.navigate(route),
            ScreenMsg::Back => self.go_back(),
            ScreenMsg::Notify(message) => self.toasts.show(Toast::info(message)),
        }
    }

    fn spawn(&self, command: Box<dyn Command>) {
        let name = command.name();
        debug!(%name, "Spawning command");
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = command.execute(tx.clone()).await {
                let _ = tx.send(AppMessage::CommandFailed {
                    name,
                    error: format!("{err:#}"),
                });
            }
        });
    }

    fn handle_messages(&mut self) {
        while let Ok(message) = self.action_rx.try_recv() {
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        debug!(?message, "Handling message");
        match message {
            AppMessage::Navigate(route) => self.navigate(route),
            AppMessage::Diary(event) => {
                let msg = self.screen.handle_diary(event);
                self.handle_screen_msg(msg);
            }
            AppMessage::SignedIn { username } => {
                self.toasts
                    .show(Toast::success(format!("Signed in as {username}")));
                self.username = Some(username);
                if self.route == Route::Login {
                    self.navigate(self.return_route);
                }
            }
            AppMessage::SignedOut => {
                self.username = None;
                self.toasts.show(Toast::info("Signed out"));
            }
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::CommandFailed { name, error } => {
                warn!(%name, %error, "Command failed");
                self.screen.command_failed();
                self.show_error(format!("{name} failed: {error}"));
            }
        }
    }

    /// Switch screens.
    ///
    /// Every open dialog belongs to the page being left, so the whole stack
    /// is cleared before the next screen starts.
    fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        info!(from = ?self.route, to = ?route, "Changing route");

        self.dialogs.close_all();
        self.theme_selector = None;
        self.error_dialogs.clear();
        self.screen.leave();

        if route == Route::Login {
            self.return_route = self.route;
        }
        self.route = route;
        self.screen = self.build_screen(route);

        let init = self.screen.init();
        self.handle_screen_msg(init);
    }

    fn go_back(&mut self) {
        match self.route {
            Route::Diary => {}
            Route::Entry(_) => self.navigate(Route::Diary),
            Route::Login => self.navigate(self.return_route),
        }
    }

    fn build_screen(&self, route: Route) -> Box<dyn Screen> {
        let ctx = self.ctx.clone();
        match route {
            Route::Diary => Box::new(DiaryListScreen::new(ctx)),
            Route::Entry(id) => Box::new(EntryScreen::new(ctx, id)),
            Route::Login => Box::new(LoginScreen::new(ctx)),
        }
    }

    fn show_error(&mut self, message: String) {
        let id = self
            .dialogs
            .open(ErrorDialog::new(message, Arc::clone(&self.resolver)));
        self.error_dialogs.push(id);
    }

    fn apply_theme(&mut self, name: &str) {
        info!(theme = name, "Switching theme");
        self.theme = theme_from_name(name);
        if let Err(err) = config::save_theme(name) {
            warn!(error = %err, "Failed to save theme");
            self.show_error(format!("Could not save theme: {err}"));
        }
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(self.theme.base())), area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .split(area);

            self.screen.render(frame, chunks[0], &self.theme);

            let info = StatusInfo {
                username: self.username.clone(),
                breadcrumbs: self.screen.breadcrumbs(),
                open_dialogs: self.dialogs.count(),
                top_dialog: self.dialogs.top_title(),
            };
            let mut keybindings = self.screen.keybindings();
            keybindings.extend(self.status_bar.global_keybindings());
            self.status_bar
                .render(frame, chunks[1], &self.theme, &info, &keybindings);

            self.host.render(&self.dialogs, frame, area, &self.theme);
            self.toasts.render(frame, area, &self.theme);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crossterm::event::{KeyCode, KeyModifiers, MouseButton};

    use super::*;
    use crate::config::AuthConfig;
    use crate::ui::ConfirmDialog;

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn app() -> App {
        let dir = std::env::temp_dir().join(format!(
            "lazydiary-app-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        App::new(
            Arc::new(KeyResolver::default()),
            Theme::default(),
            Arc::new(DiaryStore::new(dir.join("diary.json"))),
            Arc::new(SessionStore::new(
                dir.join("session.json"),
                AuthConfig::default(),
            )),
        )
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_route_change_closes_all_dialogs() {
        let mut app = app();
        app.show_error("one".to_string());
        app.show_error("two".to_string());
        assert!(app.dialogs.scroll_lock().is_locked());

        app.navigate(Route::Login);

        assert!(!app.dialogs.is_open());
        assert!(!app.dialogs.scroll_lock().is_locked());
        assert!(app.error_dialogs.is_empty());
        assert_eq!(app.return_route, Route::Diary);
    }

    #[tokio::test]
    async fn test_back_from_login_returns_to_previous_route() {
        let mut app = app();
        app.navigate(Route::Entry(EntryId(7)));
        app.navigate(Route::Login);

        app.go_back();

        assert_eq!(app.route, Route::Entry(EntryId(7)));
    }

    #[tokio::test]
    async fn test_signed_out_guard_prompt_leads_to_login() {
        let mut app = app();

        app.handle_key(key('n')).unwrap();
        assert_eq!(app.dialogs.count(), 1);

        // Confirm the prompt with the default confirm key.
        app.handle_key(key('y')).unwrap();
        app.handle_messages();

        assert_eq!(app.route, Route::Login);
        assert!(!app.dialogs.is_open());
    }

    #[tokio::test]
    async fn test_keys_go_to_topmost_dialog_first() {
        let mut app = app();
        app.handle_key(key('t')).unwrap();
        let selector = app.theme_selector.unwrap();

        // 'q' would quit if it reached the global handler.
        app.handle_key(key('q')).unwrap();
        assert!(!app.should_quit);
        assert!(app.dialogs.contains(selector));

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(!app.dialogs.is_open());
        assert!(app.theme_selector.is_none());

        app.handle_key(key('q')).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_unowned_dialog_answer_closes_dialog() {
        let mut app = app();
        let id = app
            .dialogs
            .open(ConfirmDialog::new("stray", Arc::clone(&app.resolver)));

        app.handle_dialog(id, DialogEvent::Confirmed).unwrap();

        assert!(!app.dialogs.contains(id));
    }

    #[tokio::test]
    async fn test_command_failure_shows_error_dialog() {
        let mut app = app();

        app.handle_message(AppMessage::CommandFailed {
            name: "Deleting entry #1".to_string(),
            error: "Entry #1 does not exist".to_string(),
        });

        assert_eq!(app.error_dialogs.len(), 1);
        assert_eq!(app.dialogs.top_id(), app.error_dialogs.first().copied());
    }

    #[tokio::test]
    async fn test_mouse_is_swallowed_while_dialog_open() {
        let mut app = app();
        app.show_error("boom".to_string());

        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(scroll).unwrap();

        // Nothing was rendered yet, so a click cannot be attributed.
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            ..scroll
        };
        app.handle_mouse(click).unwrap();

        assert_eq!(app.dialogs.count(), 1);
    }
}
