use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use trip_core::{Generation, SessionId, TripPreferences};
use trip_logging::{trip_error, trip_info};

use crate::filename::plan_filename;
use crate::persist::AtomicFileWriter;
use crate::subscription::{subscribe, StreamSink, Subscription};
use crate::{EngineConfig, EngineEvent, ReqwestApi, ResearchApi, StreamItem};

enum EngineCommand {
    CreateSession {
        generation: Generation,
        prefs: TripPreferences,
    },
    Subscribe {
        generation: Generation,
        session_id: SessionId,
    },
    Unsubscribe {
        generation: Generation,
    },
    Ask {
        generation: Generation,
        session_id: SessionId,
        question: String,
    },
    Download {
        session_id: SessionId,
        destination: String,
    },
}

/// Runs backend IO on a worker thread and reports results as `EngineEvent`s.
///
/// The worker keeps at most one live subscription: subscribing again cancels
/// the previous one before the new stream is opened.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        match ReqwestApi::new(config.client.clone()) {
            Ok(api) => spawn_worker(Arc::new(api), config, cmd_rx, event_tx),
            Err(err) => {
                trip_error!("Could not build HTTP client: {}", err);
                let _ = event_tx.send(EngineEvent::Fatal(err.to_string()));
            }
        }
        Self { cmd_tx, event_rx }
    }

    /// Uses a caller-provided backend instead of the HTTP client.
    pub fn with_api(config: EngineConfig, api: Arc<dyn ResearchApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        spawn_worker(api, config, cmd_rx, event_tx);
        Self { cmd_tx, event_rx }
    }

    pub fn create_session(&self, generation: Generation, prefs: TripPreferences) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::CreateSession { generation, prefs });
    }

    pub fn subscribe(&self, generation: Generation, session_id: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::Subscribe {
            generation,
            session_id,
        });
    }

    /// Cancels the live subscription if it belongs to `generation`.
    pub fn unsubscribe(&self, generation: Generation) {
        let _ = self.cmd_tx.send(EngineCommand::Unsubscribe { generation });
    }

    pub fn ask(&self, generation: Generation, session_id: SessionId, question: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Ask {
            generation,
            session_id,
            question: question.into(),
        });
    }

    pub fn download(&self, session_id: SessionId, destination: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            session_id,
            destination: destination.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct ChannelStreamSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl StreamSink for ChannelStreamSink {
    fn deliver(&self, generation: Generation, item: StreamItem) {
        let _ = self.tx.send(EngineEvent::Stream { generation, item });
    }
}

fn spawn_worker(
    api: Arc<dyn ResearchApi>,
    config: EngineConfig,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(err) => {
                trip_error!("Could not start engine runtime: {}", err);
                let _ = event_tx.send(EngineEvent::Fatal(err.to_string()));
                return;
            }
        };
        let sink: Arc<dyn StreamSink> = Arc::new(ChannelStreamSink {
            tx: event_tx.clone(),
        });
        let config = Arc::new(config);
        let mut live: Option<Subscription> = None;

        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::Subscribe {
                    generation,
                    session_id,
                } => {
                    if let Some(previous) = live.take() {
                        previous.cancel();
                    }
                    live = Some(subscribe(
                        runtime.handle(),
                        api.clone(),
                        session_id,
                        generation,
                        sink.clone(),
                    ));
                }
                EngineCommand::Unsubscribe { generation } => {
                    if live
                        .as_ref()
                        .is_some_and(|subscription| subscription.generation() == generation)
                    {
                        if let Some(subscription) = live.take() {
                            subscription.cancel();
                        }
                    }
                }
                command => {
                    let api = api.clone();
                    let config = config.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_request(api.as_ref(), &config, command, event_tx).await;
                    });
                }
            }
        }

        if let Some(subscription) = live.take() {
            subscription.cancel();
        }
        trip_info!("Engine worker stopped");
    });
}

async fn handle_request(
    api: &dyn ResearchApi,
    config: &EngineConfig,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::CreateSession { generation, prefs } => EngineEvent::SessionCreated {
            generation,
            result: api.start_research(&prefs).await,
        },
        EngineCommand::Ask {
            generation,
            session_id,
            question,
        } => EngineEvent::ChatAnswered {
            generation,
            result: api.ask(&session_id, &question).await,
        },
        EngineCommand::Download {
            session_id,
            destination,
        } => EngineEvent::PlanDownloaded {
            result: download(api, config, &session_id, &destination).await,
        },
        EngineCommand::Subscribe { .. } | EngineCommand::Unsubscribe { .. } => return,
    };
    let _ = event_tx.send(event);
}

async fn download(
    api: &dyn ResearchApi,
    config: &EngineConfig,
    session_id: &SessionId,
    destination: &str,
) -> Result<std::path::PathBuf, String> {
    let plan = api
        .download_plan(session_id)
        .await
        .map_err(|err| err.to_string())?;
    let filename = plan
        .filename
        .unwrap_or_else(|| plan_filename(destination, &(config.timestamp)()));
    let writer = AtomicFileWriter::new(config.output_dir.clone());
    let path = writer
        .write(&filename, &plan.content)
        .map_err(|err| err.to_string())?;
    trip_info!("Saved plan for {} to {:?}", session_id, path);
    Ok(path)
}
