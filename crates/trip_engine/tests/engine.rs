use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt as _;
use tempfile::TempDir;
use trip_core::{PhaseId, SessionId, StreamEvent, TripPreferences};
use trip_engine::{
    ApiError, ByteStream, EngineConfig, EngineEvent, EngineHandle, FailureKind, PlanDownload,
    ResearchApi, StreamItem,
};

const WAIT: Duration = Duration::from_secs(5);

/// In-memory backend. Every stream sends one `phase_start` for its session
/// and then stays open until the reader goes away.
#[derive(Default)]
struct FakeBackend {
    opened: Mutex<Vec<SessionId>>,
    filename: Option<String>,
}

#[async_trait::async_trait]
impl ResearchApi for FakeBackend {
    async fn start_research(&self, prefs: &TripPreferences) -> Result<SessionId, ApiError> {
        if prefs.destination == "Atlantis" {
            return Err(ApiError {
                kind: FailureKind::HttpStatus(500),
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(SessionId::new(format!("job-{}", prefs.destination.to_lowercase())))
    }

    async fn open_stream(&self, session_id: &SessionId) -> Result<ByteStream, ApiError> {
        self.opened.lock().unwrap().push(session_id.clone());
        let frame = "event: phase_start\ndata: {\"phase_id\":\"transport\"}\n\n";
        let first: Result<Bytes, ApiError> = Ok(Bytes::from_static(frame.as_bytes()));
        Ok(Box::pin(stream::iter(vec![first]).chain(stream::pending())))
    }

    async fn ask(&self, _session_id: &SessionId, question: &str) -> Result<String, ApiError> {
        if question.is_empty() {
            return Err(ApiError {
                kind: FailureKind::HttpStatus(400),
                message: "Question is required".to_string(),
            });
        }
        Ok(format!("About '{question}': yes."))
    }

    async fn download_plan(&self, session_id: &SessionId) -> Result<PlanDownload, ApiError> {
        Ok(PlanDownload {
            filename: self.filename.clone(),
            content: Bytes::from(format!("# Plan for {session_id}\n")),
        })
    }
}

fn config(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default_with_output(dir.path().to_path_buf());
    config.timestamp = Arc::new(|| "20261019_0930".to_string());
    config
}

fn next(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

#[test]
fn create_session_reports_id_or_error_with_generation() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_api(config(&temp), Arc::new(FakeBackend::default()));

    engine.create_session(1, TripPreferences::for_destination("Kyoto"));
    assert_eq!(
        next(&engine),
        EngineEvent::SessionCreated {
            generation: 1,
            result: Ok(SessionId::new("job-kyoto")),
        }
    );

    engine.create_session(2, TripPreferences::for_destination("Atlantis"));
    match next(&engine) {
        EngineEvent::SessionCreated {
            generation: 2,
            result: Err(err),
        } => assert_eq!(err.kind, FailureKind::HttpStatus(500)),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn subscribe_forwards_tagged_events() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_api(config(&temp), Arc::new(FakeBackend::default()));

    engine.subscribe(4, SessionId::new("job-a"));
    assert_eq!(
        next(&engine),
        EngineEvent::Stream {
            generation: 4,
            item: StreamItem::Event(StreamEvent::PhaseStart {
                phase_id: PhaseId::Transport
            }),
        }
    );
}

#[test]
fn resubscribing_replaces_the_live_stream() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(FakeBackend::default());
    let engine = EngineHandle::with_api(config(&temp), backend.clone());

    engine.subscribe(1, SessionId::new("job-a"));
    assert!(matches!(next(&engine), EngineEvent::Stream { generation: 1, .. }));
    engine.subscribe(2, SessionId::new("job-b"));
    assert!(matches!(next(&engine), EngineEvent::Stream { generation: 2, .. }));

    // Stale unsubscribe must not touch generation 2.
    engine.unsubscribe(1);
    engine.unsubscribe(2);
    assert!(engine.recv_timeout(Duration::from_millis(100)).is_none());
    assert_eq!(
        *backend.opened.lock().unwrap(),
        vec![SessionId::new("job-a"), SessionId::new("job-b")]
    );
}

#[test]
fn ask_returns_answer_for_its_generation() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_api(config(&temp), Arc::new(FakeBackend::default()));

    engine.ask(3, SessionId::new("job-a"), "Is tap water safe?");
    assert_eq!(
        next(&engine),
        EngineEvent::ChatAnswered {
            generation: 3,
            result: Ok("About 'Is tap water safe?': yes.".to_string()),
        }
    );
}

#[test]
fn download_uses_server_filename() {
    let temp = TempDir::new().unwrap();
    let backend = FakeBackend {
        filename: Some("trip_rome_20261001_1200.md".to_string()),
        ..FakeBackend::default()
    };
    let engine = EngineHandle::with_api(config(&temp), Arc::new(backend));

    engine.download(SessionId::new("job-rome"), "Rome");
    let path = match next(&engine) {
        EngineEvent::PlanDownloaded { result: Ok(path) } => path,
        other => panic!("unexpected event: {other:?}"),
    };
    assert_eq!(path, temp.path().join("trip_rome_20261001_1200.md"));
    assert_eq!(fs::read_to_string(path).unwrap(), "# Plan for job-rome\n");
}

#[test]
fn download_falls_back_to_destination_filename() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_api(config(&temp), Arc::new(FakeBackend::default()));

    engine.download(SessionId::new("job-nyc"), "New York City");
    match next(&engine) {
        EngineEvent::PlanDownloaded { result: Ok(path) } => {
            assert_eq!(
                path,
                temp.path().join("trip_new_york_city_20261019_0930.md")
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn download_into_a_file_reports_failure() {
    let temp = TempDir::new().unwrap();
    let blocked = temp.path().join("blocked");
    fs::write(&blocked, "x").unwrap();
    let mut config = config(&temp);
    config.output_dir = blocked;
    let engine = EngineHandle::with_api(config, Arc::new(FakeBackend::default()));

    engine.download(SessionId::new("job-a"), "Lima");
    assert!(matches!(
        next(&engine),
        EngineEvent::PlanDownloaded { result: Err(_) }
    ));
}
