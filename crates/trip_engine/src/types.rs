use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use thiserror::Error;
use trip_core::{Generation, SessionId, StreamEvent};

/// Raw body of a research event stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Item forwarded by a live subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Event(StreamEvent),
    /// Transport failure or premature end of stream. Always the last item.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SessionCreated {
        generation: Generation,
        result: Result<SessionId, ApiError>,
    },
    Stream {
        generation: Generation,
        item: StreamItem,
    },
    ChatAnswered {
        generation: Generation,
        result: Result<String, ApiError>,
    },
    PlanDownloaded {
        result: Result<PathBuf, String>,
    },
    /// The engine worker could not start.
    Fatal(String),
}

/// Downloaded plan file; the content is stored as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDownload {
    pub filename: Option<String>,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
        }
    }
}
