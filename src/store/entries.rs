use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-reported mood level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excellent,
    Good,
    Neutral,
    Down,
    Struggling,
}

/// A single mood check-in
///
/// Field names are load-bearing: previously stored data must keep
/// deserializing, so `id`/`date`/`mood`/`note` stay exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Opaque unique identifier
    pub id: String,

    /// When the entry was created (ISO 8601 on disk)
    pub date: DateTime<Utc>,

    /// Reported mood level
    pub mood: Mood,

    /// Free-text note accompanying the check-in
    pub note: String,
}

impl MoodEntry {
    pub fn new(mood: Mood, note: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: Utc::now(),
            mood,
            note: note.into(),
        }
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Opaque unique identifier
    pub id: String,

    /// When the entry was created (ISO 8601 on disk)
    pub date: DateTime<Utc>,

    /// Entry title (non-empty, validated at the API boundary)
    pub title: String,

    /// Entry body (non-empty, validated at the API boundary)
    pub content: String,
}

impl JournalEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: Utc::now(),
            title: title.into(),
            content: content.into(),
        }
    }
}
