use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;
use crate::commands::Command;
use crate::session::SessionStore;

pub struct SignInCmd {
    sessions: Arc<SessionStore>,
    username: String,
    password: String,
}

impl SignInCmd {
    pub const fn new(sessions: Arc<SessionStore>, username: String, password: String) -> Self {
        Self {
            sessions,
            username,
            password,
        }
    }
}

#[async_trait]
impl Command for SignInCmd {
    fn name(&self) -> String {
        format!("Signing in as {}", self.username)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let session = self.sessions.sign_in(&self.username, &self.password).await?;
        action_tx.send(AppMessage::SignedIn {
            username: session.username,
        })?;
        Ok(())
    }
}

pub struct SignOutCmd {
    sessions: Arc<SessionStore>,
}

impl SignOutCmd {
    pub const fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Command for SignOutCmd {
    fn name(&self) -> String {
        "Signing out".to_string()
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        self.sessions.sign_out().await?;
        action_tx.send(AppMessage::SignedOut)?;
        Ok(())
    }
}
