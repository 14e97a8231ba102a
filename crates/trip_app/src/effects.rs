use std::time::Duration;

use trip_core::{Effect, Msg};
use trip_engine::{EngineConfig, EngineEvent, EngineHandle, FailureKind, StreamItem};
use trip_logging::{trip_debug, trip_info, trip_warn};

/// Executes `Effect`s on the engine and turns its events back into `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_engine(EngineHandle::new(config))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CreateSession { generation, prefs } => {
                    trip_info!(
                        "CreateSession generation={} destination={:?}",
                        generation,
                        prefs.destination
                    );
                    self.engine.create_session(generation, prefs);
                }
                Effect::OpenStream {
                    generation,
                    session_id,
                } => {
                    trip_debug!("OpenStream generation={} session={}", generation, session_id);
                    self.engine.subscribe(generation, session_id);
                }
                Effect::CloseStream { generation } => {
                    trip_debug!("CloseStream generation={}", generation);
                    self.engine.unsubscribe(generation);
                }
                Effect::AskQuestion {
                    generation,
                    session_id,
                    question,
                } => {
                    trip_debug!(
                        "AskQuestion generation={} session={} question_len={}",
                        generation,
                        session_id,
                        question.len()
                    );
                    self.engine.ask(generation, session_id, question);
                }
                Effect::DownloadPlan {
                    session_id,
                    destination,
                } => {
                    trip_info!("DownloadPlan session={}", session_id);
                    self.engine.download(session_id, destination);
                }
            }
        }
    }

    /// Next engine result, if one is ready. `Err` means the engine is gone.
    pub fn poll(&self) -> Option<Result<Msg, String>> {
        self.engine.try_recv().map(map_event)
    }

    pub fn wait(&self, timeout: Duration) -> Option<Result<Msg, String>> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Result<Msg, String> {
    let msg = match event {
        EngineEvent::SessionCreated { generation, result } => match result {
            Ok(session_id) => Msg::SessionCreated {
                generation,
                session_id,
            },
            Err(err) => Msg::SessionFailed {
                generation,
                message: err.to_string(),
            },
        },
        EngineEvent::Stream { generation, item } => match item {
            StreamItem::Event(event) => Msg::StreamEvent { generation, event },
            StreamItem::Failed(message) => Msg::StreamFailed {
                generation,
                message,
            },
        },
        EngineEvent::ChatAnswered { generation, result } => Msg::ChatAnswered {
            generation,
            result: result.map_err(|err| match err.kind {
                FailureKind::HttpStatus(_) => err.message,
                _ => err.to_string(),
            }),
        },
        EngineEvent::PlanDownloaded { result } => match result {
            Ok(path) => Msg::PlanSaved {
                path: path.display().to_string(),
            },
            Err(message) => {
                trip_warn!("Plan download failed: {}", message);
                Msg::DownloadFailed { message }
            }
        },
        EngineEvent::Fatal(message) => return Err(message),
    };
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use trip_core::{PhaseId, StreamEvent};
    use trip_engine::ApiError;

    #[test]
    fn session_failure_carries_the_transport_error() {
        let msg = map_event(EngineEvent::SessionCreated {
            generation: 2,
            result: Err(ApiError {
                kind: FailureKind::HttpStatus(502),
                message: "Bad Gateway".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Ok(Msg::SessionFailed {
                generation: 2,
                message: "http status 502: Bad Gateway".to_string(),
            })
        );
    }

    #[test]
    fn stream_items_keep_their_generation() {
        assert_eq!(
            map_event(EngineEvent::Stream {
                generation: 7,
                item: StreamItem::Event(StreamEvent::PhaseStart {
                    phase_id: PhaseId::Rules
                }),
            }),
            Ok(Msg::StreamEvent {
                generation: 7,
                event: StreamEvent::PhaseStart {
                    phase_id: PhaseId::Rules
                },
            })
        );
        assert_eq!(
            map_event(EngineEvent::Stream {
                generation: 7,
                item: StreamItem::Failed("connection reset".to_string()),
            }),
            Ok(Msg::StreamFailed {
                generation: 7,
                message: "connection reset".to_string(),
            })
        );
    }

    #[test]
    fn chat_errors_use_backend_detail_when_present() {
        let msg = map_event(EngineEvent::ChatAnswered {
            generation: 1,
            result: Err(ApiError {
                kind: FailureKind::HttpStatus(404),
                message: "Session not found".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Ok(Msg::ChatAnswered {
                generation: 1,
                result: Err("Session not found".to_string()),
            })
        );

        let msg = map_event(EngineEvent::ChatAnswered {
            generation: 1,
            result: Err(ApiError {
                kind: FailureKind::Timeout,
                message: "operation timed out".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Ok(Msg::ChatAnswered {
                generation: 1,
                result: Err("timeout: operation timed out".to_string()),
            })
        );
    }

    #[test]
    fn download_results_and_fatal_errors() {
        assert_eq!(
            map_event(EngineEvent::PlanDownloaded {
                result: Ok(PathBuf::from("plans/trip_goa.md")),
            }),
            Ok(Msg::PlanSaved {
                path: "plans/trip_goa.md".to_string(),
            })
        );
        assert_eq!(
            map_event(EngineEvent::Fatal("no runtime".to_string())),
            Err("no runtime".to_string())
        );
    }
}
