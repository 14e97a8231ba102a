//! Trip planner core: phase catalog, stream reconciliation, chat transcript,
//! and the pure controller state machine.
mod chat;
mod effect;
mod error;
mod event;
mod msg;
mod phase;
mod prefs;
mod research;
mod state;
mod update;
mod view_model;

pub use chat::{ChatMessage, ChatRole, ChatTranscript};
pub use effect::Effect;
pub use error::{SessionError, ValidationError};
pub use event::{PhaseResult, SearchEvent, StreamEvent};
pub use msg::Msg;
pub use phase::{default_phase, phase, Phase, PhaseId, UnknownPhase, PHASES};
pub use prefs::{Budget, TravelStyle, TripPreferences, MAX_DAYS, MIN_DAYS};
pub use research::{Applied, PhaseStatus, ResearchState, SessionId};
pub use state::{AppState, DownloadStatus, Generation};
pub use update::update;
pub use view_model::{estimated_cost, AppViewModel, PhaseRowView};
