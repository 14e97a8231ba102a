use serde::{Deserialize, Serialize};

use crate::PhaseId;

/// One `search` notification. `count` is cumulative within the phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEvent {
    pub phase_id: PhaseId,
    pub query: String,
    pub count: u32,
}

/// Final output of a phase, delivered once on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase_id: PhaseId,
    pub markdown: String,
    pub searches: u32,
}

/// Decoded event from a session's research stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    PhaseStart {
        phase_id: PhaseId,
    },
    Search(SearchEvent),
    PhaseComplete(PhaseResult),
    PhaseError {
        phase_id: PhaseId,
        message: Option<String>,
    },
    ResearchComplete {
        total_searches: u32,
    },
    Heartbeat,
    /// Malformed or unrecognised frame; dropped by the reducer.
    Ignored {
        event: String,
        reason: String,
    },
}

impl StreamEvent {
    /// Wire name of the event, as sent in the `event:` field.
    pub fn name(&self) -> &str {
        match self {
            StreamEvent::PhaseStart { .. } => "phase_start",
            StreamEvent::Search(_) => "search",
            StreamEvent::PhaseComplete(_) => "phase_complete",
            StreamEvent::PhaseError { .. } => "phase_error",
            StreamEvent::ResearchComplete { .. } => "research_complete",
            StreamEvent::Heartbeat => "heartbeat",
            StreamEvent::Ignored { event, .. } => event,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::ResearchComplete { .. })
    }
}
