use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrospectId(pub u64);

impl fmt::Display for RetrospectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A later reflection attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retrospect {
    pub id: RetrospectId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: EntryId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub retrospects: Vec<Retrospect>,
}

impl DiaryEntry {
    /// First line of the body, for list previews.
    pub fn summary(&self) -> &str {
        self.body.lines().next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_is_first_line() {
        let now = Utc::now();
        let entry = DiaryEntry {
            id: EntryId(1),
            title: "Monday".to_string(),
            body: "Rained all day.\nStayed in.".to_string(),
            created_at: now,
            updated_at: now,
            retrospects: vec![],
        };
        assert_eq!(entry.summary(), "Rained all day.");
    }

    #[test]
    fn test_missing_retrospects_default_to_empty() {
        let entry: DiaryEntry = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "t",
                "body": "b",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.id, EntryId(3));
        assert!(entry.retrospects.is_empty());
    }
}
