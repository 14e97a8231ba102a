use crate::{Generation, PhaseId, SessionId, StreamEvent, TripPreferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the preferences form.
    StartRequested(TripPreferences),
    /// User asked to rerun research with the last submitted preferences.
    RegenerateRequested,
    /// User abandoned the current session.
    ResetRequested,
    /// Backend accepted the job.
    SessionCreated {
        generation: Generation,
        session_id: SessionId,
    },
    /// Job creation failed at the transport or HTTP level.
    SessionFailed {
        generation: Generation,
        message: String,
    },
    /// Decoded event from the research stream.
    StreamEvent {
        generation: Generation,
        event: StreamEvent,
    },
    /// The research stream broke or ended before `research_complete`.
    StreamFailed {
        generation: Generation,
        message: String,
    },
    /// User asked a question about the research results.
    ChatSubmitted(String),
    /// Chat request finished; `Err` carries a human-readable description.
    ChatAnswered {
        generation: Generation,
        result: Result<String, String>,
    },
    ChatCleared,
    /// User switched the visible result tab.
    PhaseSelected(PhaseId),
    /// User asked for the combined plan file.
    DownloadRequested,
    PlanSaved {
        path: String,
    },
    DownloadFailed {
        message: String,
    },
    /// Render tick to coalesce output.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
