use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt as _;
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;
use trip_core::{Generation, PhaseId, SessionId, StreamEvent, TripPreferences};
use trip_engine::{
    subscribe, ApiError, ByteStream, ClientSettings, FailureKind, PlanDownload, ReqwestApi,
    ResearchApi, StreamItem, StreamSink,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CollectingSink {
    items: Mutex<Vec<(Generation, StreamItem)>>,
}

impl CollectingSink {
    fn items(&self) -> Vec<(Generation, StreamItem)> {
        self.items.lock().unwrap().clone()
    }

    async fn wait_for(&self, count: usize) -> Vec<(Generation, StreamItem)> {
        for _ in 0..200 {
            let items = self.items();
            if items.len() >= count {
                return items;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.items()
    }
}

impl StreamSink for CollectingSink {
    fn deliver(&self, generation: Generation, item: StreamItem) {
        self.items.lock().unwrap().push((generation, item));
    }
}

/// Backend whose stream yields the given chunks and then stays open.
struct ScriptedApi {
    chunks: Vec<&'static str>,
}

#[async_trait::async_trait]
impl ResearchApi for ScriptedApi {
    async fn start_research(&self, _prefs: &TripPreferences) -> Result<SessionId, ApiError> {
        Ok(SessionId::new("scripted"))
    }

    async fn open_stream(&self, _session_id: &SessionId) -> Result<ByteStream, ApiError> {
        let chunks: Vec<Result<Bytes, ApiError>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect();
        Ok(Box::pin(stream::iter(chunks).chain(stream::pending())))
    }

    async fn ask(&self, _session_id: &SessionId, question: &str) -> Result<String, ApiError> {
        Ok(question.to_string())
    }

    async fn download_plan(&self, _session_id: &SessionId) -> Result<PlanDownload, ApiError> {
        Err(ApiError {
            kind: FailureKind::HttpStatus(400),
            message: "No results yet".to_string(),
        })
    }
}

fn events(items: &[(Generation, StreamItem)]) -> Vec<StreamEvent> {
    items
        .iter()
        .filter_map(|(_, item)| match item {
            StreamItem::Event(event) => Some(event.clone()),
            StreamItem::Failed(_) => None,
        })
        .collect()
}

const FULL_RUN: &str = "event: phase_start\ndata: {\"phase_id\":\"flights\",\"phase_index\":0}\n\n\
event: search\ndata: {\"phase_id\":\"flights\",\"query\":\"DEL to NRT\",\"count\":1}\n\n\
event: bogus\ndata: {}\n\n\
event: search\ndata: {broken\n\n\
event: heartbeat\ndata: \n\n\
event: phase_complete\ndata: {\"phase_id\":\"flights\",\"searches\":1,\"markdown\":\"# Flights\"}\n\n\
event: research_complete\ndata: {\"total_searches\":1}\n\n\
event: search\ndata: {\"phase_id\":\"hotels\",\"query\":\"after end\",\"count\":1}\n\n";

#[tokio::test]
async fn subscription_forwards_events_and_stops_after_completion() {
    trip_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research/s1/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FULL_RUN, "text/event-stream"))
        .mount(&server)
        .await;

    let api = Arc::new(
        ReqwestApi::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .unwrap(),
    );
    let sink = Arc::new(CollectingSink::default());
    let subscription = subscribe(
        &Handle::current(),
        api,
        SessionId::new("s1"),
        3,
        sink.clone(),
    );

    let items = sink.wait_for(7).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let items_after = sink.items();
    assert_eq!(items.len(), 7);
    assert_eq!(items_after.len(), 7, "nothing after research_complete");
    assert!(items.iter().all(|(generation, _)| *generation == 3));

    let events = events(&items);
    assert_eq!(
        events[0],
        StreamEvent::PhaseStart {
            phase_id: PhaseId::Flights
        }
    );
    assert!(matches!(events[2], StreamEvent::Ignored { ref event, .. } if event == "bogus"));
    assert!(matches!(events[3], StreamEvent::Ignored { ref event, .. } if event == "search"));
    assert_eq!(events[4], StreamEvent::Heartbeat);
    assert_eq!(
        events.last(),
        Some(&StreamEvent::ResearchComplete { total_searches: 1 })
    );
    assert!(subscription.is_cancelled());
}

#[tokio::test]
async fn stream_ending_early_reports_failure() {
    trip_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research/s2/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: phase_start\ndata: {\"phase_id\":\"hotels\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let api = Arc::new(
        ReqwestApi::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .unwrap(),
    );
    let sink = Arc::new(CollectingSink::default());
    let _subscription = subscribe(&Handle::current(), api, SessionId::new("s2"), 1, sink.clone());

    let items = sink.wait_for(2).await;
    assert_eq!(
        items,
        vec![
            (
                1,
                StreamItem::Event(StreamEvent::PhaseStart {
                    phase_id: PhaseId::Hotels
                })
            ),
            (
                1,
                StreamItem::Failed("stream ended before research completed".to_string())
            ),
        ]
    );
}

#[tokio::test]
async fn failed_open_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research/missing/stream"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = Arc::new(
        ReqwestApi::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .unwrap(),
    );
    let sink = Arc::new(CollectingSink::default());
    let _subscription =
        subscribe(&Handle::current(), api, SessionId::new("missing"), 1, sink.clone());

    let items = sink.wait_for(1).await;
    assert_eq!(
        items,
        vec![(1, StreamItem::Failed("http status 404: Not Found".to_string()))]
    );
}

#[tokio::test]
async fn cancel_is_idempotent_and_silences_the_reader() {
    let api = Arc::new(ScriptedApi {
        chunks: vec!["event: phase_start\ndata: {\"phase_id\":\"rules\"}\n\n"],
    });
    let sink = Arc::new(CollectingSink::default());
    let subscription = subscribe(&Handle::current(), api, SessionId::new("x"), 5, sink.clone());

    assert_eq!(sink.wait_for(1).await.len(), 1);
    subscription.cancel();
    subscription.cancel();
    assert!(subscription.is_cancelled());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(sink.items().len(), 1);
    assert!(!sink
        .items()
        .iter()
        .any(|(_, item)| matches!(item, StreamItem::Failed(_))));
}

#[tokio::test]
async fn dropping_subscription_cancels_it() {
    let api = Arc::new(ScriptedApi { chunks: Vec::new() });
    let sink = Arc::new(CollectingSink::default());
    let subscription = subscribe(&Handle::current(), api, SessionId::new("x"), 1, sink.clone());
    drop(subscription);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(sink.items().is_empty());
}
