// ABOUTME: Send orchestrator: gates submissions and runs one remote exchange at a time.
// ABOUTME: Maps every outcome (reply or failure) to exactly one assistant entry in the transcript.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::responder::{RemoteResponder, ResponderError};
use crate::session::state::{SessionEvent, SessionState};
use crate::session::transcript::{ChatEntry, EntryId, Role, Transcript};

/// Shown in place of the assistant's reply when a request fails.
pub const DEFAULT_ERROR_TEXT: &str = "\u{26a0}\u{fe0f} Error connecting to server. Please try again.";

/// Where the orchestrator is in its submit/respond cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    Sending,
}

/// Why a submission was not accepted. Neither case touches the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("submission is empty")]
    EmptySubmission,
    #[error("a request is already in flight")]
    AlreadyBusy,
}

/// The finished result of one remote exchange, delivered back to the
/// orchestrator through its completion channel.
#[derive(Debug)]
pub struct Completion {
    request: u64,
    outcome: Result<String, ResponderError>,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Tunables for an orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Text written to the transcript when a request fails.
    pub error_text: String,
    /// Give up on a request after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            timeout: None,
        }
    }
}

/// Drives the Idle/Sending state machine for one chat session.
///
/// The orchestrator is the only writer of its [`SessionState`]. Remote calls
/// run on spawned tasks and report back through a channel that only
/// [`SendOrchestrator::next_completion`] reads, so transcript appends always
/// happen in submission order. Must be used from within a Tokio runtime.
pub struct SendOrchestrator {
    state: SessionState,
    responder: Arc<dyn RemoteResponder>,
    options: OrchestratorOptions,
    next_request: u64,
    in_flight: Option<u64>,
    last_succeeded: Option<bool>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl SendOrchestrator {
    pub fn new(responder: Arc<dyn RemoteResponder>) -> Self {
        Self::with_options(responder, OrchestratorOptions::default())
    }

    pub fn with_options(responder: Arc<dyn RemoteResponder>, options: OrchestratorOptions) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(),
            responder,
            options,
            next_request: 0,
            in_flight: None,
            last_succeeded: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Accept a submission: echo it into the transcript as a user entry,
    /// mark the session busy, and start the remote exchange.
    ///
    /// Returns the id of the user entry. Blank text and submissions made
    /// while a request is in flight are rejected without any state change.
    pub fn submit(&mut self, text: &str) -> Result<EntryId, SubmitError> {
        if text.trim().is_empty() {
            debug!("ignoring empty submission");
            return Err(SubmitError::EmptySubmission);
        }
        if self.in_flight.is_some() {
            debug!("dropping submission while a request is in flight");
            return Err(SubmitError::AlreadyBusy);
        }

        let entry = self.state.record(Role::User, text);
        let request = self.next_request;
        self.next_request += 1;
        self.in_flight = Some(request);
        self.state.set_busy(true);

        info!(entry = %entry, request, "submission accepted");

        let responder = self.responder.clone();
        let tx = self.completions_tx.clone();
        let timeout = self.options.timeout;
        let message = text.to_string();
        tokio::spawn(async move {
            let call = AssertUnwindSafe(responder.respond(&message))
                .catch_unwind()
                .map(|result| result.unwrap_or_else(|panic| Err(panicked(panic))));
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .unwrap_or(Err(ResponderError::TimedOut(limit))),
                None => call.await,
            };
            // The receiver lives as long as the orchestrator; if it is gone
            // the session is over and the result has nowhere to go.
            let _ = tx.send(Completion { request, outcome });
        });

        Ok(entry)
    }

    /// Wait for the in-flight exchange to finish. Pending forever while idle,
    /// which makes it safe to use as a `tokio::select!` branch.
    pub async fn next_completion(&mut self) -> Completion {
        match self.completions_rx.recv().await {
            Some(completion) => completion,
            // Unreachable while `self` holds a sender, but never spin.
            None => std::future::pending().await,
        }
    }

    /// Record a finished exchange and return to idle.
    ///
    /// Appends exactly one assistant entry: the reply on success, the fixed
    /// error text on failure. Completions for anything but the in-flight
    /// request are discarded and yield `None`.
    pub fn apply(&mut self, completion: Completion) -> Option<EntryId> {
        if self.in_flight != Some(completion.request) {
            warn!(request = completion.request, "discarding stale completion");
            return None;
        }

        self.last_succeeded = Some(completion.is_success());
        let entry = match completion.outcome {
            Ok(reply) => {
                debug!(request = completion.request, "reply received");
                self.state.record(Role::Assistant, reply)
            }
            Err(e) => {
                warn!(request = completion.request, error = %e, "remote responder failed");
                self.state.record(Role::Assistant, self.options.error_text.clone())
            }
        };

        self.in_flight = None;
        self.state.set_busy(false);
        Some(entry)
    }

    /// If a request is in flight, wait for it and record the outcome.
    /// Returns the assistant entry id, or `None` when idle.
    pub async fn settle(&mut self) -> Option<EntryId> {
        while self.in_flight.is_some() {
            let completion = self.next_completion().await;
            if let Some(entry) = self.apply(completion) {
                return Some(entry);
            }
        }
        None
    }

    /// Submit and wait for the exchange to finish, returning the id of the
    /// resulting assistant entry.
    pub async fn send(&mut self, text: &str) -> Result<EntryId, SubmitError> {
        self.submit(text)?;
        match self.settle().await {
            Some(entry) => Ok(entry),
            // `submit` just put a request in flight, so `settle` always records one.
            None => Err(SubmitError::AlreadyBusy),
        }
    }

    pub fn snapshot(&self) -> &[ChatEntry] {
        self.state.transcript().snapshot()
    }

    pub fn transcript(&self) -> &Transcript {
        self.state.transcript()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn phase(&self) -> SendPhase {
        if self.in_flight.is_some() {
            SendPhase::Sending
        } else {
            SendPhase::Idle
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.state.subscribe()
    }

    /// Whether the most recently recorded exchange got a reply. `None`
    /// until the first exchange finishes.
    pub fn last_exchange_succeeded(&self) -> Option<bool> {
        self.last_succeeded
    }

    pub fn responder_label(&self) -> String {
        self.responder.describe()
    }

    pub fn error_text(&self) -> &str {
        &self.options.error_text
    }
}

/// Turn a caught panic payload into a responder failure.
fn panicked(payload: Box<dyn Any + Send>) -> ResponderError {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ResponderError::Panicked(reason)
}
