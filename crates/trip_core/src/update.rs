use trip_logging::{trip_debug, trip_info, trip_warn};

use crate::{Applied, AppState, DownloadStatus, Effect, Msg, TripPreferences};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested(prefs) => start(&mut state, prefs),
        Msg::RegenerateRequested => match state.last_prefs().cloned() {
            Some(prefs) => start(&mut state, prefs),
            None => Vec::new(),
        },
        Msg::ResetRequested => {
            let stale = state.begin_generation();
            trip_info!("Session reset; now at generation {}", state.generation());
            stale
                .map(|generation| vec![Effect::CloseStream { generation }])
                .unwrap_or_default()
        }
        Msg::SessionCreated {
            generation,
            session_id,
        } => {
            if !state.is_current(generation) {
                trip_debug!("Dropping stale session {} (generation {})", session_id, generation);
                return (state, Vec::new());
            }
            trip_info!("Research session {} created", session_id);
            state.attach_session(session_id.clone());
            vec![Effect::OpenStream {
                generation,
                session_id,
            }]
        }
        Msg::SessionFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) {
                trip_warn!("Failed to start research: {}", message);
                state.fail_session(message);
            }
            Vec::new()
        }
        Msg::StreamEvent { generation, event } => {
            if !state.is_current(generation) || !state.is_stream_live() {
                trip_debug!(
                    "Dropping {} from superseded subscription (generation {})",
                    event.name(),
                    generation
                );
                return (state, Vec::new());
            }
            match state.apply_stream_event(event) {
                Applied::Finished => {
                    trip_info!(
                        "Research complete with {} searches",
                        state.research().total_searches()
                    );
                    state.close_stream();
                    vec![Effect::CloseStream { generation }]
                }
                Applied::Changed | Applied::Unchanged => Vec::new(),
            }
        }
        Msg::StreamFailed {
            generation,
            message,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            if state.fail_stream(message.clone()) {
                trip_warn!("Research stream failed: {}", message);
            }
            if state.close_stream() {
                vec![Effect::CloseStream { generation }]
            } else {
                Vec::new()
            }
        }
        Msg::ChatSubmitted(question) => {
            let Some(session_id) = state.research().session_id().cloned() else {
                return (state, Vec::new());
            };
            match state.chat_mut().submit(&question) {
                Some(question) => {
                    state.mark_dirty();
                    vec![Effect::AskQuestion {
                        generation: state.generation(),
                        session_id,
                        question,
                    }]
                }
                None => Vec::new(),
            }
        }
        Msg::ChatAnswered { generation, result } => {
            if state.is_current(generation) && state.chat().is_pending() {
                state.chat_mut().resolve(result);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ChatCleared => {
            if !state.chat().messages().is_empty() {
                state.chat_mut().clear();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PhaseSelected(phase_id) => {
            state.select_phase(phase_id);
            Vec::new()
        }
        Msg::DownloadRequested => {
            let research = state.research();
            match (research.session_id(), research.results().next()) {
                (Some(session_id), Some(_)) => vec![Effect::DownloadPlan {
                    session_id: session_id.clone(),
                    destination: state
                        .last_prefs()
                        .map(|prefs| prefs.destination.clone())
                        .unwrap_or_default(),
                }],
                _ => Vec::new(),
            }
        }
        Msg::PlanSaved { path } => {
            state.set_download(DownloadStatus::Saved(path));
            Vec::new()
        }
        Msg::DownloadFailed { message } => {
            state.set_download(DownloadStatus::Failed(message));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut AppState, prefs: TripPreferences) -> Vec<Effect> {
    if let Err(err) = prefs.validate() {
        trip_warn!("Rejected trip preferences: {}", err);
        state.reject_prefs(err);
        return Vec::new();
    }

    let stale = state.begin_generation();
    let generation = state.generation();
    trip_info!(
        "Starting research for {:?} (generation {})",
        prefs.destination,
        generation
    );
    state.remember_prefs(prefs.clone());

    let mut effects = Vec::with_capacity(2);
    if let Some(stale) = stale {
        effects.push(Effect::CloseStream { generation: stale });
    }
    effects.push(Effect::CreateSession { generation, prefs });
    effects
}
