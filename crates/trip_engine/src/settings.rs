use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// HTTP settings for talking to the research backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Backend origin; every route lives under `{base_url}/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to job creation, chat and download. The event stream has no
    /// overall timeout; heartbeats keep it alive.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Produces the timestamp used in fallback plan filenames (`YYYYmmdd_HHMM`).
pub type TimestampFn = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    pub output_dir: PathBuf,
    pub timestamp: TimestampFn,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            client: ClientSettings::default(),
            output_dir,
            timestamp: Arc::new(|| "00000000_0000".to_string()),
        }
    }
}
