//! JSON file store for diary entries.
//!
//! The whole diary is one document. Every mutation reads the document,
//! changes it and writes it back under a lock, so concurrent commands never
//! lose each other's writes. A missing file is an empty diary.

use std::path::{Path, PathBuf};

use chrono::Utc;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::model::{DiaryEntry, EntryId, Retrospect, RetrospectId};

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    /// Next id to hand out, shared by entries and retrospects.
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    entries: Vec<DiaryEntry>,
}

const fn first_id() -> u64 {
    1
}

impl Document {
    const fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut DiaryEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| eyre!("Entry {id} does not exist"))
    }
}

#[derive(Debug)]
pub struct DiaryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DiaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<DiaryEntry>> {
        let mut entries = self.read().await?.entries;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    pub async fn get(&self, id: EntryId) -> Result<DiaryEntry> {
        self.read()
            .await?
            .entries
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| eyre!("Entry {id} does not exist"))
    }

    pub async fn create(&self, title: &str, body: &str) -> Result<DiaryEntry> {
        let title = title.trim();
        if title.is_empty() {
            return Err(eyre!("An entry needs a title"));
        }

        self.modify(|doc| {
            let now = Utc::now();
            let entry = DiaryEntry {
                id: EntryId(doc.allocate_id()),
                title: title.to_string(),
                body: body.to_string(),
                created_at: now,
                updated_at: now,
                retrospects: Vec::new(),
            };
            doc.entries.push(entry.clone());
            Ok(entry)
        })
        .await
    }

    /// Replace the body of an entry.
    pub async fn update(&self, id: EntryId, body: &str) -> Result<DiaryEntry> {
        self.modify(|doc| {
            let entry = doc.entry_mut(id)?;
            entry.body = body.to_string();
            entry.updated_at = Utc::now();
            Ok(entry.clone())
        })
        .await
    }

    pub async fn delete(&self, id: EntryId) -> Result<()> {
        self.modify(|doc| {
            let before = doc.entries.len();
            doc.entries.retain(|entry| entry.id != id);
            if doc.entries.len() == before {
                return Err(eyre!("Entry {id} does not exist"));
            }
            Ok(())
        })
        .await
    }

    pub async fn add_retrospect(&self, id: EntryId, body: &str) -> Result<DiaryEntry> {
        let body = body.trim();
        if body.is_empty() {
            return Err(eyre!("A retrospect cannot be empty"));
        }

        self.modify(|doc| {
            let retrospect_id = RetrospectId(doc.allocate_id());
            let entry = doc.entry_mut(id)?;
            entry.retrospects.push(Retrospect {
                id: retrospect_id,
                body: body.to_string(),
                created_at: Utc::now(),
            });
            Ok(entry.clone())
        })
        .await
    }

    pub async fn delete_retrospect(
        &self,
        id: EntryId,
        retrospect: RetrospectId,
    ) -> Result<DiaryEntry> {
        self.modify(|doc| {
            let entry = doc.entry_mut(id)?;
            let before = entry.retrospects.len();
            entry.retrospects.retain(|r| r.id != retrospect);
            if entry.retrospects.len() == before {
                return Err(eyre!("Retrospect {retrospect} does not exist on entry {id}"));
            }
            Ok(entry.clone())
        })
        .await
    }

    async fn read(&self) -> Result<Document> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse diary at {}", self.path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Diary file missing, starting empty");
                Ok(Document {
                    next_id: first_id(),
                    entries: Vec::new(),
                })
            }
            Err(err) => Err(err)
                .wrap_err_with(|| format!("Failed to read diary at {}", self.path.display())),
        }
    }

    async fn modify<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _lock = self.write_lock.lock().await;
        let mut doc = self.read().await?;
        let value = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(value)
    }

    async fn write(&self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path)
            .await
            .wrap_err_with(|| format!("Failed to write diary at {}", self.path.display()))?;
        debug!(path = %self.path.display(), entries = doc.entries.len(), "Saved diary");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn temp_store() -> DiaryStore {
        let dir = std::env::temp_dir().join(format!(
            "lazydiary-store-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        DiaryStore::new(dir.join("diary.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_diary() {
        let store = temp_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let store = temp_store();

        let created = store.create("  Monday ", "Rained.").await.unwrap();
        assert_eq!(created.title, "Monday");
        assert_eq!(store.get(created.id).await.unwrap(), created);

        let updated = store.update(created.id, "Sunny after all.").await.unwrap();
        assert_eq!(updated.body, "Sunny after all.");
        assert!(updated.updated_at >= created.updated_at);

        store.delete(created.id).await.unwrap();
        assert!(store.get(created.id).await.is_err());
        assert!(store.delete(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let store = temp_store();
        assert!(store.create("   ", "body").await.is_err());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = temp_store();
        let first = store.create("one", "").await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create("two", "").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = temp_store();
        let first = store.create("one", "").await.unwrap();
        let second = store.create("two", "").await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_retrospects() {
        let store = temp_store();
        let entry = store.create("Exam", "Nervous.").await.unwrap();

        let with_one = store.add_retrospect(entry.id, "It went fine.").await.unwrap();
        assert_eq!(with_one.retrospects.len(), 1);
        let retrospect = with_one.retrospects[0].id;

        assert!(store.add_retrospect(entry.id, "  ").await.is_err());

        let without = store.delete_retrospect(entry.id, retrospect).await.unwrap();
        assert!(without.retrospects.is_empty());
        assert!(store.delete_retrospect(entry.id, retrospect).await.is_err());
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let store = temp_store();
        let entry = store.create("Persisted", "yes").await.unwrap();

        let reopened = DiaryStore::new(store.path());
        assert_eq!(reopened.get(entry.id).await.unwrap().title, "Persisted");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        fs::write(store.path(), "{ not json").await.unwrap();

        assert!(store.list().await.is_err());
    }
}
