//! Diary entries and their on-disk store.

mod model;
mod store;

pub use model::{DiaryEntry, EntryId, Retrospect, RetrospectId};
pub use store::DiaryStore;
