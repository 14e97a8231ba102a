use std::sync::Arc;

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use trip_core::{Generation, SessionId};
use trip_logging::{trip_debug, trip_info, trip_warn};

use crate::decode::decode_event;
use crate::sse::SseDecoder;
use crate::{ResearchApi, StreamItem};

const ENDED_EARLY: &str = "stream ended before research completed";

/// Receives the items of a subscription, tagged with its generation.
pub trait StreamSink: Send + Sync {
    fn deliver(&self, generation: Generation, item: StreamItem);
}

/// Handle to one live event stream. Cancelling (or dropping) it stops the
/// reader; nothing is delivered after cancellation is observed.
#[derive(Debug)]
pub struct Subscription {
    generation: Generation,
    session_id: SessionId,
    token: CancellationToken,
}

impl Subscription {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Idempotent.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            trip_debug!(
                "Cancelling subscription for {} (generation {})",
                self.session_id,
                self.generation
            );
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Opens the event stream for `session_id` on `runtime` and forwards decoded
/// events to `sink` until `research_complete`, a transport failure, or
/// cancellation. No reconnection is attempted.
pub fn subscribe(
    runtime: &Handle,
    api: Arc<dyn ResearchApi>,
    session_id: SessionId,
    generation: Generation,
    sink: Arc<dyn StreamSink>,
) -> Subscription {
    let token = CancellationToken::new();
    let reader_token = token.clone();
    let reader_session = session_id.clone();
    runtime.spawn(async move {
        read_stream(api, reader_session, generation, sink, reader_token).await;
    });
    Subscription {
        generation,
        session_id,
        token,
    }
}

async fn read_stream(
    api: Arc<dyn ResearchApi>,
    session_id: SessionId,
    generation: Generation,
    sink: Arc<dyn StreamSink>,
    token: CancellationToken,
) {
    let opened = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        opened = api.open_stream(&session_id) => opened,
    };
    let mut body = match opened {
        Ok(body) => body,
        Err(err) => {
            trip_warn!("Could not open stream for {}: {}", session_id, err);
            if !token.is_cancelled() {
                sink.deliver(generation, StreamItem::Failed(err.to_string()));
            }
            return;
        }
    };
    trip_info!("Subscribed to {} (generation {})", session_id, generation);

    let mut decoder = SseDecoder::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                trip_debug!("Subscription for {} cancelled", session_id);
                return;
            }
            next = body.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                for frame in decoder.push(&chunk) {
                    if token.is_cancelled() {
                        return;
                    }
                    let event = decode_event(&frame);
                    let terminal = event.is_terminal();
                    sink.deliver(generation, StreamItem::Event(event));
                    if terminal {
                        trip_info!("Research stream for {} finished", session_id);
                        token.cancel();
                        return;
                    }
                }
            }
            Some(Err(err)) => {
                trip_warn!("Stream for {} failed: {}", session_id, err);
                if !token.is_cancelled() {
                    sink.deliver(generation, StreamItem::Failed(err.to_string()));
                }
                return;
            }
            None => {
                if !token.is_cancelled() {
                    sink.deliver(generation, StreamItem::Failed(ENDED_EARLY.to_string()));
                }
                return;
            }
        }
    }
}
