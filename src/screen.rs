//! Full-page screens.
//!
//! Exactly one screen is active at a time, selected by the App's
//! [`Route`]. Screens open dialogs on the shared stack and receive the
//! answers through [`Screen::handle_dialog`].

mod diary_list;
mod entry;
mod login;

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use diary_list::DiaryListScreen;
pub use entry::EntryScreen;
pub use login::LoginScreen;

use crate::Theme;
use crate::app::{AppNavigator, DiaryEvent, Route};
use crate::commands::Command;
use crate::config::KeyResolver;
use crate::diary::DiaryStore;
use crate::overlay::{AuthGuard, Dialogs, ModalId};
use crate::session::SessionStore;
use crate::ui::{DialogEvent, EventResult, Keybinding, Result};

pub enum ScreenMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Switch to another screen
    Navigate(Route),
    /// Leave this screen for its parent
    Back,
    /// Tell the user something without interrupting them
    Notify(String),
}

impl<T: Command> From<T> for ScreenMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

/// Shared services every screen is built from.
#[derive(Clone)]
pub struct ScreenContext {
    pub dialogs: Dialogs,
    pub resolver: Arc<KeyResolver>,
    pub store: Arc<DiaryStore>,
    pub sessions: Arc<SessionStore>,
    pub navigator: Arc<AppNavigator>,
}

impl ScreenContext {
    /// A login guard bound to the shared dialog stack.
    pub fn auth_guard(&self) -> AuthGuard {
        AuthGuard::new(
            self.dialogs.clone(),
            self.sessions.clone(),
            self.navigator.clone(),
            Arc::clone(&self.resolver),
        )
    }
}

/// A page of the application.
///
/// The App calls methods in this order:
///
/// 1. `init()` - once when the screen becomes active
/// 2. For each event:
///    - `handle_key()` if no dialog took the key
///    - `handle_dialog()` when a dialog answers
///    - `handle_diary()` when a command reports back
/// 3. `leave()` - when the route changes away from this screen
pub trait Screen {
    /// Start loading whatever the screen shows.
    fn init(&mut self) -> ScreenMsg {
        ScreenMsg::Idle
    }

    /// Forget pending prompts before the screen is dropped.
    fn leave(&mut self) {}

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ScreenMsg>>;

    /// Scroll the page by `delta` rows. Only called while no dialog is open.
    fn handle_scroll(&mut self, delta: isize) {
        _ = delta;
    }

    /// Handle an answer from a dialog.
    ///
    /// Returns `Ignored` if `id` is not one of this screen's dialogs.
    fn handle_dialog(&mut self, id: ModalId, event: DialogEvent) -> Result<EventResult<ScreenMsg>> {
        _ = (id, event);
        Ok(EventResult::Ignored)
    }

    fn handle_diary(&mut self, event: DiaryEvent) -> ScreenMsg {
        _ = event;
        ScreenMsg::Idle
    }

    /// A command started by this screen failed.
    fn command_failed(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments for the status bar.
    fn breadcrumbs(&self) -> Vec<String>;

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

    use super::*;
    use crate::app::AppMessage;
    use crate::config::AuthConfig;

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    pub struct Fixture {
        pub ctx: ScreenContext,
        pub tx: UnboundedSender<AppMessage>,
        pub rx: UnboundedReceiver<AppMessage>,
    }

    /// A context backed by fresh files in the temp directory.
    pub async fn fixture(signed_in: bool) -> Fixture {
        let dir = std::env::temp_dir().join(format!(
            "lazydiary-screen-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let sessions = Arc::new(SessionStore::new(
            dir.join("session.json"),
            AuthConfig::default(),
        ));
        if signed_in {
            sessions.sign_in("ada", "secret").await.unwrap();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = ScreenContext {
            dialogs: Dialogs::default(),
            resolver: Arc::new(KeyResolver::default()),
            store: Arc::new(DiaryStore::new(dir.join("diary.json"))),
            sessions,
            navigator: Arc::new(AppNavigator::new(tx.clone())),
        };
        Fixture { ctx, tx, rx }
    }
}
