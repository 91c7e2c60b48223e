//! Testing utilities.
//!
//! `MockGateway` stands in for a model vendor in deterministic tests:
//! script replies and failures in order, then assert on the calls the
//! session actually made.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use gm_gateway::{ChatRole, ChatTurn, GatewayError, ModelGateway};

/// A call the mock received, captured for assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The system prompt of the call.
    pub system: String,
    /// Number of conversation turns sent.
    pub turn_count: usize,
    /// Role and text of the final turn, if any.
    pub last_turn: Option<(ChatRole, String)>,
    /// Token budget of the call.
    pub max_tokens: usize,
}

/// Scripted response queue for the mock.
enum Scripted {
    Reply(String),
    Failure(String),
}

/// A gateway that returns scripted responses without any network calls.
#[derive(Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Reply(text.into()));
        self
    }

    /// Queue a gateway failure.
    pub fn failure(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Failure(message.into()));
        self
    }

    /// Queue a reply on an existing mock.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.push(Scripted::Reply(text.into()));
    }

    /// Queue a failure on an existing mock.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.push(Scripted::Failure(message.into()));
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    fn push(&self, scripted: Scripted) {
        self.script.lock().expect("script lock").push_back(scripted);
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn generate(
        &self,
        system: &str,
        turns: &[ChatTurn],
        max_tokens: usize,
    ) -> Result<String, GatewayError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            system: system.to_string(),
            turn_count: turns.len(),
            last_turn: turns.last().map(|t| (t.role, t.text.clone())),
            max_tokens,
        });

        match self.script.lock().expect("script lock").pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(GatewayError::Network(message)),
            None => Ok("The game master has no more scripted responses.".to_string()),
        }
    }
}
