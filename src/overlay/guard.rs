//! Login prompt in front of protected actions.
//!
//! A guarded action calls [`AuthGuard::check`] and proceeds only when it
//! returns `true`. When the user is not signed in, the guard pushes a
//! "Log in?" prompt onto the shared dialog stack and the action is
//! abandoned; it is not replayed after login.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{Dialogs, ModalId, ModalOptions};
use crate::config::KeyResolver;
use crate::ui::{ConfirmDialog, DialogEvent, Result};

/// Answers whether the current user is signed in.
pub trait AuthStatus {
    /// An error means the status is unknown; the guard treats it as signed
    /// out.
    fn is_authenticated(&self) -> Result<bool>;
}

/// Moves the application to its login page.
pub trait Navigator {
    fn go_to_login(&self);
}

/// Observable state of one guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardState {
    pub prompt_shown: bool,
    pub prompt_id: Option<ModalId>,
}

pub struct AuthGuard {
    dialogs: Dialogs,
    auth: Arc<dyn AuthStatus>,
    navigator: Arc<dyn Navigator>,
    resolver: Arc<KeyResolver>,
    state: GuardState,
}

impl AuthGuard {
    pub fn new(
        dialogs: Dialogs,
        auth: Arc<dyn AuthStatus>,
        navigator: Arc<dyn Navigator>,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            dialogs,
            auth,
            navigator,
            resolver,
            state: GuardState::default(),
        }
    }

    /// Returns `true` when the protected action may run.
    ///
    /// Otherwise shows the login prompt, unless this guard's prompt is
    /// already open, and returns `false`.
    pub fn check(&mut self) -> bool {
        let authenticated = self.auth.is_authenticated().unwrap_or_else(|err| {
            warn!(error = %err, "Could not determine sign-in status, treating as signed out");
            false
        });
        if authenticated {
            return true;
        }
        if self.state.prompt_shown {
            debug!(prompt = ?self.state.prompt_id, "Login prompt already open");
            return false;
        }

        let prompt = ConfirmDialog::new(
            "You need to be signed in to do that. Log in now?",
            Arc::clone(&self.resolver),
        )
        .with_title("Log in?")
        .with_confirm_text("Log in")
        .with_cancel_text("Cancel");
        let id = self
            .dialogs
            .open_with(prompt, ModalOptions::prevent_backdrop_close());

        self.state = GuardState {
            prompt_shown: true,
            prompt_id: Some(id),
        };
        debug!(%id, "Opened login prompt");
        false
    }

    /// Handle an answer from the dialog stack.
    ///
    /// Returns whether `id` was this guard's prompt. Confirming closes the
    /// prompt and navigates to the login page; any other answer just closes
    /// it.
    pub fn resolve(&mut self, id: ModalId, event: &DialogEvent) -> bool {
        if self.state.prompt_id != Some(id) {
            return false;
        }

        self.dialogs.close(Some(id));
        self.state = GuardState::default();

        if *event == DialogEvent::Confirmed {
            debug!(%id, "Login prompt confirmed");
            self.navigator.go_to_login();
        }
        true
    }

    /// Forget any open prompt, closing it if it is still on the stack.
    pub fn reset(&mut self) {
        if let Some(id) = self.state.prompt_id {
            self.dialogs.close(Some(id));
        }
        self.state = GuardState::default();
    }

    pub const fn state(&self) -> GuardState {
        self.state
    }
}
