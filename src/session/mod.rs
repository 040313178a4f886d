// ABOUTME: Session module: transcript store, per-session state, and the send orchestrator.
// ABOUTME: Everything that turns a submission into an ordered, recoverable transcript.

pub mod orchestrator;
pub mod state;
pub mod transcript;

pub use orchestrator::{
    Completion, DEFAULT_ERROR_TEXT, OrchestratorOptions, SendOrchestrator, SendPhase, SubmitError,
};
pub use state::{SessionEvent, SessionState};
pub use transcript::{ChatEntry, EntryId, Role, Transcript};
