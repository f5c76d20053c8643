//! Local persistence of wellness records
//!
//! This module provides the append-only mood and journal collections:
//! - Flat key/value store of serialized JSON lists
//! - Typed entry shapes matching the persisted field names
//! - Newest-first ordering, preserved across round trips

mod entries;
mod local;

pub use entries::{JournalEntry, Mood, MoodEntry};
pub use local::{LocalStore, WellnessStore, JOURNAL_KEY, MOODS_KEY};
