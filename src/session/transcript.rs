// ABOUTME: Append-only transcript store: the ordered log of chat entries for one session.
// ABOUTME: Allocates monotonically increasing entry ids that are never reused.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a transcript entry, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single role-tagged message. Fields are read-only once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    id: EntryId,
    role: Role,
    text: String,
    created_at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered, append-only log of chat entries.
///
/// Insertion order is display order is chronological order. Nothing is ever
/// removed or reordered, and the only way in is [`Transcript::append`].
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry at the tail and return its freshly allocated id.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(ChatEntry {
            id,
            role,
            text: text.into(),
            created_at: Utc::now(),
        });
        id
    }

    /// The current transcript, oldest first.
    pub fn snapshot(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Look up an entry by id. Ids map to positions because they start at
    /// zero and nothing is ever removed.
    pub fn get(&self, id: EntryId) -> Option<&ChatEntry> {
        let index = usize::try_from(id.0).ok()?;
        self.entries.get(index).filter(|e| e.id == id)
    }
}
