//! Trip engine: backend HTTP client, event stream subscriptions, and effect execution.
mod api;
mod decode;
mod engine;
mod filename;
mod persist;
mod settings;
mod sse;
mod subscription;
mod types;

pub use api::{download_url, ReqwestApi, ResearchApi};
pub use decode::decode_event;
pub use engine::EngineHandle;
pub use filename::{content_disposition_filename, plan_filename};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use settings::{ClientSettings, EngineConfig, TimestampFn};
pub use sse::{SseDecoder, SseFrame};
pub use subscription::{subscribe, StreamSink, Subscription};
pub use types::{ApiError, ByteStream, EngineEvent, FailureKind, PlanDownload, StreamItem};
