//! Reconciliation of the research event stream into a monotonic view.
//!
//! `ResearchState::apply` is the single reducer for stream events.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use trip_logging::{trip_debug, trip_warn};

use crate::{PhaseId, PhaseResult, SearchEvent, SessionError, StreamEvent};

/// Opaque identifier issued by the backend for one research job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseStatus {
    #[default]
    Pending,
    Running,
    Complete,
    Error,
}

impl PhaseStatus {
    fn rank(self) -> u8 {
        match self {
            PhaseStatus::Pending => 0,
            PhaseStatus::Running => 1,
            PhaseStatus::Complete | PhaseStatus::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Forward-only transition check: pending -> running -> {complete | error}.
    pub fn can_advance_to(self, next: PhaseStatus) -> bool {
        next.rank() > self.rank()
    }
}

/// Outcome of applying one stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Unchanged,
    Changed,
    /// `research_complete` was applied; the subscription must be closed.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchState {
    session_id: Option<SessionId>,
    phase_statuses: BTreeMap<PhaseId, PhaseStatus>,
    current_phase: Option<PhaseId>,
    search_log: Vec<SearchEvent>,
    latest_counts: BTreeMap<PhaseId, u32>,
    total_searches: u32,
    results: BTreeMap<PhaseId, PhaseResult>,
    is_complete: bool,
    error: Option<SessionError>,
}

impl Default for ResearchState {
    fn default() -> Self {
        Self {
            session_id: None,
            phase_statuses: PhaseId::ALL
                .into_iter()
                .map(|id| (id, PhaseStatus::Pending))
                .collect(),
            current_phase: None,
            search_log: Vec::new(),
            latest_counts: BTreeMap::new(),
            total_searches: 0,
            results: BTreeMap::new(),
            is_complete: false,
            error: None,
        }
    }
}

impl ResearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn status(&self, phase_id: PhaseId) -> PhaseStatus {
        self.phase_statuses
            .get(&phase_id)
            .copied()
            .unwrap_or_default()
    }

    /// Statuses for every known phase, in catalog order.
    pub fn phase_statuses(&self) -> impl Iterator<Item = (PhaseId, PhaseStatus)> + '_ {
        self.phase_statuses.iter().map(|(id, status)| (*id, *status))
    }

    pub fn current_phase(&self) -> Option<PhaseId> {
        self.current_phase
    }

    pub fn search_log(&self) -> &[SearchEvent] {
        &self.search_log
    }

    pub fn total_searches(&self) -> u32 {
        self.total_searches
    }

    /// Latest cumulative search count reported for a phase.
    pub fn latest_count(&self, phase_id: PhaseId) -> u32 {
        self.latest_counts.get(&phase_id).copied().unwrap_or(0)
    }

    pub fn result(&self, phase_id: PhaseId) -> Option<&PhaseResult> {
        self.results.get(&phase_id)
    }

    pub fn results(&self) -> impl Iterator<Item = &PhaseResult> + '_ {
        self.results.values()
    }

    pub fn completed_count(&self) -> usize {
        self.phase_statuses
            .values()
            .filter(|status| **status == PhaseStatus::Complete)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub(crate) fn set_session_id(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }

    pub(crate) fn set_error(&mut self, error: SessionError) {
        self.error = Some(error);
    }

    /// Applies one stream event. Events arriving after `research_complete` are ignored.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        if self.is_complete {
            trip_debug!("Ignoring {} after research_complete", event.name());
            return Applied::Unchanged;
        }

        match event {
            StreamEvent::PhaseStart { phase_id } => {
                if self.status(phase_id).is_terminal() {
                    trip_debug!("phase_start for finished phase {}", phase_id);
                    return Applied::Unchanged;
                }
                self.advance(phase_id, PhaseStatus::Running);
                self.current_phase = Some(phase_id);
                Applied::Changed
            }
            StreamEvent::Search(search) => {
                self.latest_counts.insert(search.phase_id, search.count);
                self.total_searches = self
                    .latest_counts
                    .values()
                    .fold(0u32, |total, count| total.saturating_add(*count));
                self.search_log.push(search);
                Applied::Changed
            }
            StreamEvent::PhaseComplete(result) => {
                let phase_id = result.phase_id;
                if !self.advance(phase_id, PhaseStatus::Complete) {
                    trip_debug!(
                        "phase_complete for {} ignored in status {:?}",
                        phase_id,
                        self.status(phase_id)
                    );
                    return Applied::Unchanged;
                }
                self.results.entry(phase_id).or_insert(result);
                Applied::Changed
            }
            StreamEvent::PhaseError { phase_id, message } => {
                if !self.advance(phase_id, PhaseStatus::Error) {
                    return Applied::Unchanged;
                }
                trip_warn!(
                    "Phase {} failed: {}",
                    phase_id,
                    message.as_deref().unwrap_or("no details")
                );
                Applied::Changed
            }
            StreamEvent::ResearchComplete { total_searches } => {
                self.is_complete = true;
                self.total_searches = total_searches;
                self.current_phase = None;
                Applied::Finished
            }
            StreamEvent::Heartbeat => Applied::Unchanged,
            StreamEvent::Ignored { event, reason } => {
                trip_warn!("Dropping stream event {:?}: {}", event, reason);
                Applied::Unchanged
            }
        }
    }

    /// Records a transport failure. Partial progress is kept; a completed
    /// research run is not downgraded.
    pub fn fail_connection(&mut self, message: impl Into<String>) -> bool {
        if self.is_complete || self.error.is_some() {
            return false;
        }
        self.error = Some(SessionError::Stream(message.into()));
        true
    }

    fn advance(&mut self, phase_id: PhaseId, next: PhaseStatus) -> bool {
        let status = self.phase_statuses.entry(phase_id).or_default();
        if status.can_advance_to(next) {
            *status = next;
            true
        } else {
            false
        }
    }
}
