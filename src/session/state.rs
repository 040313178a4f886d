// ABOUTME: Per-session state: transcript, busy flag, and the change notification channel.
// ABOUTME: The single owned struct the orchestrator mutates; observers subscribe for events.

use tokio::sync::broadcast;

use crate::session::transcript::{ChatEntry, EntryId, Role, Transcript};

/// Capacity of the notification channel. A subscriber that falls further
/// behind receives `Lagged` and should resync from a snapshot.
const EVENT_CAPACITY: usize = 256;

/// Notifications published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new entry was appended at the tail of the transcript.
    EntryAppended(ChatEntry),
    /// The busy flag flipped.
    BusyChanged(bool),
}

/// Everything one chat session owns.
pub struct SessionState {
    transcript: Transcript,
    busy: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transcript: Transcript::new(),
            busy: false,
            events,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Append to the transcript and notify observers of the new tail entry.
    pub fn record(&mut self, role: Role, text: impl Into<String>) -> EntryId {
        let id = self.transcript.append(role, text);
        if let Some(entry) = self.transcript.get(id) {
            self.publish(SessionEvent::EntryAppended(entry.clone()));
        }
        id
    }

    /// Update the busy flag, notifying observers only on an actual change.
    pub fn set_busy(&mut self, busy: bool) {
        if self.busy == busy {
            return;
        }
        self.busy = busy;
        self.publish(SessionEvent::BusyChanged(busy));
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine; the state itself is the source of truth.
        let _ = self.events.send(event);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
