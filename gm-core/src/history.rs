//! The turn log: an ordered, append-only transcript.
//!
//! Appending is the only mutation. A turn in flight is modeled as a
//! [`StagedTurn`]: the player's input is held outside the log until the
//! model reply arrives, then both records are committed together. A failed
//! model call drops the stage and the log is untouched, so rollback needs
//! no cleanup.

use serde::{Deserialize, Serialize};

/// Who produced a turn record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub role: Role,
    pub content: String,
}

impl TurnRecord {
    /// Create a user record.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant record.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The ordered transcript replayed to the model on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLog {
    records: Vec<TurnRecord>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the end of the log.
    pub fn append(&mut self, record: TurnRecord) {
        self.records.push(record);
    }

    /// All records in order.
    pub fn full(&self) -> &[TurnRecord] {
        &self.records
    }

    /// The last `n` records (fewer if the log is shorter).
    pub fn window(&self, n: usize) -> &[TurnRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove and return the last record when it matches the predicate.
    ///
    /// The legacy rollback contract: undo a just-appended user turn after a
    /// failed model call. New code should prefer [`TurnLog::stage`].
    pub fn remove_last_if<F>(&mut self, predicate: F) -> Option<TurnRecord>
    where
        F: FnOnce(&TurnRecord) -> bool,
    {
        if self.records.last().is_some_and(|r| predicate(r)) {
            self.records.pop()
        } else {
            None
        }
    }

    /// Begin a two-phase turn with the player's input.
    ///
    /// Nothing is appended until [`StagedTurn::commit`] is called.
    pub fn stage(&mut self, input: impl Into<String>) -> StagedTurn<'_> {
        StagedTurn {
            log: self,
            input: input.into(),
        }
    }
}

/// A player turn that has been staged but not committed.
pub struct StagedTurn<'a> {
    log: &'a mut TurnLog,
    input: String,
}

impl StagedTurn<'_> {
    /// The staged player input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The conversation to send to the model: committed records (all, or
    /// the last `recent` when bounded) followed by the staged input.
    pub fn context(&self, recent: Option<usize>) -> Vec<TurnRecord> {
        let committed = match recent {
            Some(n) => self.log.window(n),
            None => self.log.full(),
        };
        let mut turns = committed.to_vec();
        turns.push(TurnRecord::user(&self.input));
        turns
    }

    /// Commit the turn: append the staged input and the model's reply.
    pub fn commit(self, reply: impl Into<String>) {
        let input = self.input;
        self.log.append(TurnRecord::user(input));
        self.log.append(TurnRecord::assistant(reply));
    }

    /// Discard the stage, leaving the log exactly as it was.
    pub fn discard(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut log = TurnLog::new();
        log.append(TurnRecord::user("I open the chest"));
        log.append(TurnRecord::assistant("It is full of sand."));

        assert_eq!(log.len(), 2);
        assert_eq!(log.full()[0].role, Role::User);
        assert_eq!(log.full()[1].role, Role::Assistant);
    }

    #[test]
    fn test_window() {
        let mut log = TurnLog::new();
        for i in 0..10 {
            log.append(TurnRecord::user(format!("turn {i}")));
        }

        assert_eq!(log.window(3).len(), 3);
        assert_eq!(log.window(3)[0].content, "turn 7");
        assert_eq!(log.window(100).len(), 10);
    }

    #[test]
    fn test_remove_last_if() {
        let mut log = TurnLog::new();
        log.append(TurnRecord::assistant("Welcome."));
        log.append(TurnRecord::user("I flee"));

        let removed = log.remove_last_if(|r| r.role == Role::User);
        assert_eq!(removed.map(|r| r.content), Some("I flee".to_string()));
        assert_eq!(log.len(), 1);

        // Last record is now an assistant turn; predicate fails, nothing removed.
        assert!(log.remove_last_if(|r| r.role == Role::User).is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_staged_commit_appends_pair() {
        let mut log = TurnLog::new();
        let staged = log.stage("I listen at the door");
        staged.commit("Muffled voices argue about gold.");

        assert_eq!(log.len(), 2);
        assert_eq!(log.full()[0].content, "I listen at the door");
        assert_eq!(log.full()[1].role, Role::Assistant);
    }

    #[test]
    fn test_staged_discard_leaves_log_untouched() {
        let mut log = TurnLog::new();
        log.append(TurnRecord::assistant("The road forks."));

        let before = log.len();
        let staged = log.stage("I take the left path");
        staged.discard();

        assert_eq!(log.len(), before);
    }

    #[test]
    fn test_staged_context_includes_input_last() {
        let mut log = TurnLog::new();
        log.append(TurnRecord::user("hello"));
        log.append(TurnRecord::assistant("well met"));

        let staged = log.stage("I draw my sword");
        let context = staged.context(None);

        assert_eq!(context.len(), 3);
        assert_eq!(context[2].content, "I draw my sword");
        assert_eq!(context[2].role, Role::User);

        let bounded = staged.context(Some(1));
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].content, "well met");
    }

    #[test]
    fn test_serde_shape_is_bare_array() {
        let mut log = TurnLog::new();
        log.append(TurnRecord::user("hi"));

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json, serde_json::json!([{"role": "user", "content": "hi"}]));
    }
}
