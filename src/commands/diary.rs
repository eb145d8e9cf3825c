use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{AppMessage, DiaryEvent};
use crate::commands::Command;
use crate::diary::{DiaryStore, EntryId, RetrospectId};
use crate::ui::ToastType;

/// Load every entry for the list screen.
pub struct LoadEntriesCmd {
    store: Arc<DiaryStore>,
}

impl LoadEntriesCmd {
    pub const fn new(store: Arc<DiaryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Command for LoadEntriesCmd {
    fn name(&self) -> String {
        "Loading entries".to_string()
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entries = self.store.list().await?;
        action_tx.send(DiaryEvent::EntriesLoaded(entries).into())?;
        Ok(())
    }
}

pub struct LoadEntryCmd {
    store: Arc<DiaryStore>,
    id: EntryId,
}

impl LoadEntryCmd {
    pub const fn new(store: Arc<DiaryStore>, id: EntryId) -> Self {
        Self { store, id }
    }
}

#[async_trait]
impl Command for LoadEntryCmd {
    fn name(&self) -> String {
        format!("Loading entry {}", self.id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entry = self.store.get(self.id).await?;
        action_tx.send(DiaryEvent::EntryLoaded(entry).into())?;
        Ok(())
    }
}

pub struct CreateEntryCmd {
    store: Arc<DiaryStore>,
    title: String,
    body: String,
}

impl CreateEntryCmd {
    pub fn new(store: Arc<DiaryStore>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl Command for CreateEntryCmd {
    fn name(&self) -> String {
        format!("Creating entry '{}'", self.title)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entry = self.store.create(&self.title, &self.body).await?;
        action_tx.send(AppMessage::ShowToast {
            message: format!("Created '{}'", entry.title),
            toast_type: ToastType::Success,
        })?;
        action_tx.send(DiaryEvent::EntryCreated(entry).into())?;
        Ok(())
    }
}

/// Replace the body of an entry.
pub struct UpdateEntryCmd {
    store: Arc<DiaryStore>,
    id: EntryId,
    body: String,
}

impl UpdateEntryCmd {
    pub fn new(store: Arc<DiaryStore>, id: EntryId, body: impl Into<String>) -> Self {
        Self {
            store,
            id,
            body: body.into(),
        }
    }
}

#[async_trait]
impl Command for UpdateEntryCmd {
    fn name(&self) -> String {
        format!("Saving entry {}", self.id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entry = self.store.update(self.id, &self.body).await?;
        action_tx.send(AppMessage::ShowToast {
            message: "Entry saved".to_string(),
            toast_type: ToastType::Success,
        })?;
        action_tx.send(DiaryEvent::EntryUpdated(entry).into())?;
        Ok(())
    }
}

pub struct DeleteEntryCmd {
    store: Arc<DiaryStore>,
    id: EntryId,
}

impl DeleteEntryCmd {
    pub const fn new(store: Arc<DiaryStore>, id: EntryId) -> Self {
        Self { store, id }
    }
}

#[async_trait]
impl Command for DeleteEntryCmd {
    fn name(&self) -> String {
        format!("Deleting entry {}", self.id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        self.store.delete(self.id).await?;
        action_tx.send(AppMessage::ShowToast {
            message: "Entry deleted".to_string(),
            toast_type: ToastType::Success,
        })?;
        action_tx.send(DiaryEvent::EntryDeleted(self.id).into())?;
        Ok(())
    }
}

pub struct AddRetrospectCmd {
    store: Arc<DiaryStore>,
    id: EntryId,
    body: String,
}

impl AddRetrospectCmd {
    pub fn new(store: Arc<DiaryStore>, id: EntryId, body: impl Into<String>) -> Self {
        Self {
            store,
            id,
            body: body.into(),
        }
    }
}

#[async_trait]
impl Command for AddRetrospectCmd {
    fn name(&self) -> String {
        format!("Adding retrospect to entry {}", self.id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entry = self.store.add_retrospect(self.id, &self.body).await?;
        action_tx.send(DiaryEvent::RetrospectsChanged(entry).into())?;
        Ok(())
    }
}

pub struct DeleteRetrospectCmd {
    store: Arc<DiaryStore>,
    id: EntryId,
    retrospect: RetrospectId,
}

impl DeleteRetrospectCmd {
    pub const fn new(store: Arc<DiaryStore>, id: EntryId, retrospect: RetrospectId) -> Self {
        Self {
            store,
            id,
            retrospect,
        }
    }
}

#[async_trait]
impl Command for DeleteRetrospectCmd {
    fn name(&self) -> String {
        format!("Deleting retrospect {} of entry {}", self.retrospect, self.id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let entry = self
            .store
            .delete_retrospect(self.id, self.retrospect)
            .await?;
        action_tx.send(DiaryEvent::RetrospectsChanged(entry).into())?;
        Ok(())
    }
}
