use crate::view_model::{estimated_cost, AppViewModel, PhaseRowView};
use crate::{
    default_phase, Applied, ChatTranscript, PhaseId, ResearchState, SessionError,
    SessionId, StreamEvent, TripPreferences, ValidationError, PHASES,
};

/// Invalidation tag for a session. Every start or reset moves to a new
/// generation; messages carrying an older one are stale and dropped.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Saved(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    generation: Generation,
    research: ResearchState,
    chat: ChatTranscript,
    last_prefs: Option<TripPreferences>,
    validation_error: Option<ValidationError>,
    active_phase: PhaseId,
    stream_live: bool,
    download: Option<DownloadStatus>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            generation: 0,
            research: ResearchState::new(),
            chat: ChatTranscript::new(),
            last_prefs: None,
            validation_error: None,
            active_phase: default_phase(),
            stream_live: false,
            download: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn research(&self) -> &ResearchState {
        &self.research
    }

    pub fn chat(&self) -> &ChatTranscript {
        &self.chat
    }

    pub fn last_prefs(&self) -> Option<&TripPreferences> {
        self.last_prefs.as_ref()
    }

    pub fn is_stream_live(&self) -> bool {
        self.stream_live
    }

    pub fn view(&self) -> AppViewModel {
        let research = &self.research;
        let phases = PHASES
            .iter()
            .map(|entry| PhaseRowView {
                id: entry.id,
                title: entry.title,
                icon: entry.icon,
                color: entry.color,
                status: research.status(entry.id),
                searches: research.latest_count(entry.id),
                has_result: research.result(entry.id).is_some(),
            })
            .collect();

        let error = self
            .validation_error
            .clone()
            .map(SessionError::from)
            .or_else(|| research.error().cloned())
            .map(|err| err.to_string());

        AppViewModel {
            generation: self.generation,
            session_id: research.session_id().cloned(),
            destination: self.last_prefs.as_ref().map(|p| p.destination.clone()),
            phases,
            current_phase: research.current_phase(),
            active_phase: self.active_phase,
            active_markdown: research
                .result(self.active_phase)
                .map(|result| result.markdown.clone()),
            search_log: research.search_log().to_vec(),
            total_searches: research.total_searches(),
            completed_count: research.completed_count(),
            is_complete: research.is_complete(),
            error,
            chat: self.chat.messages().to_vec(),
            chat_pending: self.chat.is_pending(),
            estimated_cost: research
                .result(PhaseId::Itinerary)
                .and_then(|result| estimated_cost(&result.markdown)),
            download: self.download.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub(crate) fn reject_prefs(&mut self, error: ValidationError) {
        self.validation_error = Some(error);
        self.mark_dirty();
    }

    /// Discards everything belonging to the current session and moves to a
    /// new generation. Returns the generation whose stream must be closed,
    /// if one was live.
    pub(crate) fn begin_generation(&mut self) -> Option<Generation> {
        let stale = self.stream_live.then_some(self.generation);
        self.generation += 1;
        self.research = ResearchState::new();
        self.chat = ChatTranscript::new();
        self.validation_error = None;
        self.active_phase = default_phase();
        self.stream_live = false;
        self.download = None;
        self.mark_dirty();
        stale
    }

    pub(crate) fn remember_prefs(&mut self, prefs: TripPreferences) {
        self.last_prefs = Some(prefs);
    }

    pub(crate) fn attach_session(&mut self, session_id: SessionId) {
        self.research.set_session_id(session_id);
        self.stream_live = true;
        self.mark_dirty();
    }

    pub(crate) fn fail_session(&mut self, message: String) {
        self.research.set_error(SessionError::Network(message));
        self.mark_dirty();
    }

    pub(crate) fn apply_stream_event(&mut self, event: StreamEvent) -> Applied {
        let applied = self.research.apply(event);
        if applied != Applied::Unchanged {
            self.mark_dirty();
        }
        applied
    }

    pub(crate) fn fail_stream(&mut self, message: String) -> bool {
        let changed = self.research.fail_connection(message);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Marks the stream closed; returns whether it was live.
    pub(crate) fn close_stream(&mut self) -> bool {
        std::mem::take(&mut self.stream_live)
    }

    pub(crate) fn chat_mut(&mut self) -> &mut ChatTranscript {
        &mut self.chat
    }

    pub(crate) fn select_phase(&mut self, phase_id: PhaseId) {
        if self.active_phase != phase_id {
            self.active_phase = phase_id;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_download(&mut self, status: DownloadStatus) {
        self.download = Some(status);
        self.mark_dirty();
    }
}
