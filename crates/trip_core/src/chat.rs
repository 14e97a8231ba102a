use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation for one session, with at most one request in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Records the user's question and marks a request as outstanding.
    ///
    /// Returns the question to send, or `None` when it is blank or another
    /// request is still pending.
    pub fn submit(&mut self, question: &str) -> Option<String> {
        if question.trim().is_empty() || self.pending {
            return None;
        }
        self.messages.push(ChatMessage::user(question));
        self.pending = true;
        Some(question.to_string())
    }

    /// Appends exactly one assistant message for the outstanding request.
    pub fn resolve(&mut self, result: Result<String, String>) {
        let content = match result {
            Ok(answer) => answer,
            Err(description) => format!("Error: {description}"),
        };
        self.messages.push(ChatMessage::assistant(content));
        self.pending = false;
    }

    /// Empties the transcript. An outstanding request stays outstanding and
    /// its answer is still appended when it arrives.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
