use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::entries::{JournalEntry, MoodEntry};

/// Storage key for the mood collection
pub const MOODS_KEY: &str = "serenity_moods";

/// Storage key for the journal collection
pub const JOURNAL_KEY: &str = "serenity_journal";

/// Flat key/value store: one serialized document per key, kept as a
/// `<key>.json` file under the storage directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create storage directory: {:?}", root))?;

        info!("Local store opened at {:?}", root);

        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Read the serialized document for a key, if one has been stored.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stored document: {:?}", path))?;

        Ok(Some(raw))
    }

    /// Replace the serialized document for a key.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);

        fs::write(&path, value)
            .with_context(|| format!("Failed to write stored document: {:?}", path))?;

        Ok(())
    }
}

/// Typed wrapper over [`LocalStore`] for the two wellness collections.
///
/// Collections are newest-first and append-only from the caller's
/// perspective: entries are prepended, never edited or removed.
pub struct WellnessStore {
    store: LocalStore,
}

impl WellnessStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: LocalStore::open(root)?,
        })
    }

    /// All mood entries, newest first. An absent key is an empty list.
    pub fn moods(&self) -> Result<Vec<MoodEntry>> {
        match self.store.get(MOODS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).context("Failed to parse mood collection"),
            None => Ok(Vec::new()),
        }
    }

    /// Prepend a mood entry and persist the full collection.
    pub fn add_mood(&self, entry: MoodEntry) -> Result<Vec<MoodEntry>> {
        let mut entries = self.moods()?;
        entries.insert(0, entry);
        self.store
            .set(MOODS_KEY, &serde_json::to_string(&entries)?)?;

        info!("Mood collection now holds {} entries", entries.len());

        Ok(entries)
    }

    /// All journal entries, newest first. An absent key is an empty list.
    pub fn journal(&self) -> Result<Vec<JournalEntry>> {
        match self.store.get(JOURNAL_KEY)? {
            Some(raw) => serde_json::from_str(&raw).context("Failed to parse journal collection"),
            None => Ok(Vec::new()),
        }
    }

    /// Prepend a journal entry and persist the full collection.
    pub fn add_journal(&self, entry: JournalEntry) -> Result<Vec<JournalEntry>> {
        let mut entries = self.journal()?;
        entries.insert(0, entry);
        self.store
            .set(JOURNAL_KEY, &serde_json::to_string(&entries)?)?;

        info!("Journal collection now holds {} entries", entries.len());

        Ok(entries)
    }
}
