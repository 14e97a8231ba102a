use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION};
use serde::{Deserialize, Serialize};
use trip_core::{SessionId, TripPreferences};
use trip_logging::trip_debug;
use url::Url;

use crate::filename::content_disposition_filename;
use crate::{ApiError, ByteStream, ClientSettings, FailureKind, PlanDownload};

/// Backend operations used by the controller.
#[async_trait::async_trait]
pub trait ResearchApi: Send + Sync {
    /// Creates a research job and returns its session id.
    async fn start_research(&self, prefs: &TripPreferences) -> Result<SessionId, ApiError>;

    /// Opens the server-sent event stream for a session.
    async fn open_stream(&self, session_id: &SessionId) -> Result<ByteStream, ApiError>;

    /// Asks one question about the session's results.
    async fn ask(&self, session_id: &SessionId, question: &str) -> Result<String, ApiError>;

    async fn download_plan(&self, session_id: &SessionId) -> Result<PlanDownload, ApiError>;
}

#[derive(Deserialize)]
struct StartResponse {
    session_id: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    settings: ClientSettings,
    base: Url,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            settings,
            base,
        })
    }

    fn session_endpoint(&self, session_id: &SessionId, leaf: &str) -> Result<Url, ApiError> {
        endpoint(&self.base, &["research", session_id.as_str(), leaf])
    }
}

#[async_trait::async_trait]
impl ResearchApi for ReqwestApi {
    async fn start_research(&self, prefs: &TripPreferences) -> Result<SessionId, ApiError> {
        let url = endpoint(&self.base, &["research"])?;
        trip_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .json(prefs)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StartResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        Ok(SessionId::new(body.session_id))
    }

    async fn open_stream(&self, session_id: &SessionId) -> Result<ByteStream, ApiError> {
        let url = self.session_endpoint(session_id, "stream")?;
        trip_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error));
        Ok(Box::pin(stream))
    }

    async fn ask(&self, session_id: &SessionId, question: &str) -> Result<String, ApiError> {
        let url = self.session_endpoint(session_id, "chat")?;
        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .json(&ChatRequest { question })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        Ok(body.answer)
    }

    async fn download_plan(&self, session_id: &SessionId) -> Result<PlanDownload, ApiError> {
        let url = self.session_endpoint(session_id, "download")?;
        let response = self
            .client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let content = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(PlanDownload { filename, content })
    }
}

/// URL of the combined plan file for a session.
pub fn download_url(base_url: &str, session_id: &SessionId) -> Result<String, ApiError> {
    let base = Url::parse(base_url)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    endpoint(&base, &["research", session_id.as_str(), "download"]).map(String::from)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::new(FailureKind::InvalidUrl, format!("{base} cannot be a base")))?
        .pop_if_empty()
        .push("api")
        .extend(segments);
    Ok(url)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let reason = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|err| err.detail)
        .unwrap_or(reason);
    Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
}

fn decode_error(err: reqwest::Error) -> ApiError {
    ApiError::new(FailureKind::Decode, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return decode_error(err);
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
