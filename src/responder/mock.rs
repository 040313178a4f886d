// ABOUTME: Scripted responder for tests: replays queued replies or failures without network access.
// ABOUTME: Can be gated so a reply is held back until the test releases it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::responder::{RemoteResponder, ResponderError};

/// A pre-scripted responder. Each call pops the next outcome from the front
/// of the queue; once the queue is empty every call fails.
pub struct ScriptedResponder {
    script: Mutex<VecDeque<Result<String, String>>>,
    received: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedResponder {
    /// Build a responder from an ordered list of outcomes. `Err` entries
    /// become `ResponderError::Backend` failures.
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            received: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Convenience: a responder answering a single call with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::new(vec![Ok(reply.into())])
    }

    /// Convenience: a responder failing a single call with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(vec![Err(reason.into())])
    }

    /// Hold every reply until the returned handle is notified, once per call.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// Shared handle to the messages received so far, in call order.
    pub fn received(&self) -> Arc<Mutex<Vec<String>>> {
        self.received.clone()
    }
}

#[async_trait]
impl RemoteResponder for ScriptedResponder {
    async fn respond(&self, message: &str) -> Result<String, ResponderError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(message.to_string());
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(_) => None,
        };
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(ResponderError::Backend(reason)),
            None => Err(ResponderError::Backend("no scripted reply left".to_string())),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
