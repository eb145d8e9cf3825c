//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Screens return commands, and the App spawns them on the tokio runtime.
//! Results come back as [`AppMessage`]s; a returned error is reported by the
//! App as [`AppMessage::CommandFailed`].

mod diary;
mod session;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

pub use diary::{
    AddRetrospectCmd, CreateEntryCmd, DeleteEntryCmd, DeleteRetrospectCmd, LoadEntriesCmd,
    LoadEntryCmd, UpdateEntryCmd,
};
pub use session::{SignInCmd, SignOutCmd};

/// Async commands that perform side effects.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs and error reports.
    /// Include context like entry ids.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
