// ABOUTME: Chat controller: the single task that owns the orchestrator and the TUI state.
// ABOUTME: Multiplexes terminal events, request completions, and session notifications.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use crate::session::{Completion, SendOrchestrator, SessionEvent, SubmitError};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::TuiState;
use crate::tui::ui;

/// Drives one interactive chat session.
pub struct ChatController {
    orchestrator: SendOrchestrator,
    events: broadcast::Receiver<SessionEvent>,
    state: TuiState,
}

impl ChatController {
    pub fn new(orchestrator: SendOrchestrator) -> Self {
        let events = orchestrator.subscribe();
        let mut state = TuiState::new(orchestrator.responder_label());
        state.resync(orchestrator.snapshot(), orchestrator.is_busy());
        Self {
            orchestrator,
            events,
            state,
        }
    }

    pub fn state(&self) -> &TuiState {
        &self.state
    }

    pub fn orchestrator(&self) -> &SendOrchestrator {
        &self.orchestrator
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match handle_key(&mut self.state, key) {
            InputResult::None => {}
            InputResult::Quit => return true,
            InputResult::Send(text) => self.submit(&text),
        }
        self.sync();
        false
    }

    /// Handle one terminal event. Returns `true` when the user asked to quit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            // Needs bracketed paste enabled on the terminal.
            Event::Paste(text) => {
                self.state.insert_str_at_cursor(&text);
                false
            }
            _ => false,
        }
    }

    fn submit(&mut self, text: &str) {
        match self.orchestrator.submit(text) {
            Ok(_) => self.state.clear_input(),
            // The draft stays in the buffer so nothing the user typed is lost.
            Err(SubmitError::AlreadyBusy) => debug!("submit ignored: reply pending"),
            Err(SubmitError::EmptySubmission) => {}
        }
    }

    /// Record a finished request.
    pub fn handle_completion(&mut self, completion: Completion) {
        self.orchestrator.apply(completion);
        self.sync();
    }

    /// Wait for the in-flight request, if any, to finish.
    pub async fn next_completion(&mut self) -> Completion {
        self.orchestrator.next_completion().await
    }

    /// Drain pending session notifications into the TUI state.
    pub fn sync(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.state.apply_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session events lagged; resyncing view");
                    self.state
                        .resync(self.orchestrator.snapshot(), self.orchestrator.is_busy());
                    // Everything still queued is already covered by the snapshot.
                    self.events = self.events.resubscribe();
                    break;
                }
            }
        }
    }

    /// Run the draw/event loop until the user quits.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        let mut term_events = EventStream::new();

        loop {
            terminal.draw(|frame| ui::render(frame, &mut self.state))?;

            tokio::select! {
                completion = self.orchestrator.next_completion() => {
                    self.handle_completion(completion);
                }
                maybe_event = term_events.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if self.handle_event(event) {
                                break;
                            }
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                    }
                }
            }
        }

        if self.orchestrator.is_busy() {
            debug!("quitting with a request still in flight");
        }
        Ok(())
    }
}
