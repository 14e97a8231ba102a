use std::sync::LazyLock;

use regex::Regex;

use crate::{ChatMessage, DownloadStatus, Generation, PhaseId, PhaseStatus, SearchEvent, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub generation: Generation,
    pub session_id: Option<SessionId>,
    pub destination: Option<String>,
    pub phases: Vec<PhaseRowView>,
    pub current_phase: Option<PhaseId>,
    pub active_phase: PhaseId,
    pub active_markdown: Option<String>,
    pub search_log: Vec<SearchEvent>,
    pub total_searches: u32,
    pub completed_count: usize,
    pub is_complete: bool,
    pub error: Option<String>,
    pub chat: Vec<ChatMessage>,
    pub chat_pending: bool,
    pub estimated_cost: Option<String>,
    pub download: Option<DownloadStatus>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRowView {
    pub id: PhaseId,
    pub title: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub status: PhaseStatus,
    pub searches: u32,
    pub has_result: bool,
}

static BOLD_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*(?:Total|Grand Total)\*\*\s*\|\s*\*\*([^*]+)\*\*")
        .expect("valid total regex")
});

static TOTAL_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Total[^|]*\|\s*[^$]*(\$[\d,]+(?:\s*-\s*\$[\d,]+)?)").expect("valid row regex")
});

/// Pulls the trip total out of the itinerary's cost table, if present.
pub fn estimated_cost(markdown: &str) -> Option<String> {
    BOLD_TOTAL
        .captures(markdown)
        .or_else(|| TOTAL_ROW.captures(markdown))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|cost| !cost.is_empty())
}
