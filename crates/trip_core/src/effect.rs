use crate::{Generation, SessionId, TripPreferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateSession {
        generation: Generation,
        prefs: TripPreferences,
    },
    OpenStream {
        generation: Generation,
        session_id: SessionId,
    },
    /// Tear down the subscription for `generation`. Safe to repeat.
    CloseStream { generation: Generation },
    AskQuestion {
        generation: Generation,
        session_id: SessionId,
        question: String,
    },
    DownloadPlan {
        session_id: SessionId,
        destination: String,
    },
}
