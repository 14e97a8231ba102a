use serde::de::DeserializeOwned;
use serde::Deserialize;
use trip_core::{PhaseId, PhaseResult, SearchEvent, StreamEvent};

use crate::sse::SseFrame;

#[derive(Deserialize)]
struct PhaseStartPayload {
    phase_id: PhaseId,
}

#[derive(Deserialize)]
struct PhaseErrorPayload {
    phase_id: PhaseId,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResearchCompletePayload {
    total_searches: u32,
}

/// Turns an SSE frame into a stream event. Anything that cannot be decoded
/// becomes `StreamEvent::Ignored` so the subscription keeps going.
pub fn decode_event(frame: &SseFrame) -> StreamEvent {
    let decoded = match frame.event.as_str() {
        "phase_start" => parse::<PhaseStartPayload>(frame)
            .map(|payload| StreamEvent::PhaseStart {
                phase_id: payload.phase_id,
            }),
        "search" => parse::<SearchEvent>(frame).map(StreamEvent::Search),
        "phase_complete" => parse::<PhaseResult>(frame).map(StreamEvent::PhaseComplete),
        "phase_error" => parse::<PhaseErrorPayload>(frame).map(|payload| {
            StreamEvent::PhaseError {
                phase_id: payload.phase_id,
                message: payload.error,
            }
        }),
        "research_complete" => parse::<ResearchCompletePayload>(frame).map(|payload| {
            StreamEvent::ResearchComplete {
                total_searches: payload.total_searches,
            }
        }),
        "heartbeat" => Ok(StreamEvent::Heartbeat),
        _ => Err("unrecognised event".to_string()),
    };

    decoded.unwrap_or_else(|reason| StreamEvent::Ignored {
        event: frame.event.clone(),
        reason,
    })
}

fn parse<T: DeserializeOwned>(frame: &SseFrame) -> Result<T, String> {
    serde_json::from_str(&frame.data).map_err(|err| err.to_string())
}
