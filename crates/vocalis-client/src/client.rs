// Backend client: streamed answers plus the plain request/response calls

use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use vocalis_stream::{run, ByteStreamSource, EventSink, StreamError};

use crate::config::ClientConfig;
use crate::request::StreamRequest;

const HEALTH_PATH: &str = "/health";
const ENV_PROBE_PATH: &str = "/debug/env";
const STT_PATH: &str = "/api/stt";
const TTS_PATH: &str = "/api/tts";

/// File name the backend expects on uploaded recordings
const AUDIO_FILE_NAME: &str = "audio.webm";
const AUDIO_MIME: &str = "audio/webm";

/// Result of a backend health probe
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub status: u16,
    pub body: String,
    /// `/debug/env` payload, when the probe succeeded
    pub env: Option<Value>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Synthesized speech as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    pub audio_base64: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Transcription {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for the assistant backend
///
/// Each streamed call builds its own decoder and router, so one client can
/// serve concurrent streams.
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
    request_timeout: Option<Duration>,
    stream_timeout: Option<Duration>,
    default_voice: Option<String>,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::with_backend_url(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.backend.request_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.backend.url.trim_end_matches('/').to_string(),
            request_timeout: config.backend.request_timeout(),
            stream_timeout: config.backend.stream_timeout(),
            default_voice: config.tts.voice.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_timeout(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Stream one answer, dispatching events to `sinks` as they arrive
    ///
    /// Returns the concatenated answer text. A failed request, a non-success
    /// status or a broken body fails the whole call; expiry of the stream
    /// deadline is reported as [`StreamError::Cancelled`].
    pub async fn stream<S>(
        &self,
        request: &StreamRequest,
        sinks: &mut S,
    ) -> vocalis_stream::Result<String>
    where
        S: EventSink + ?Sized,
    {
        let streamed = self.open_and_run(request, sinks);

        match self.stream_timeout {
            Some(limit) => match tokio::time::timeout(limit, streamed).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        profile = request.profile.as_str(),
                        timeout_secs = limit.as_secs(),
                        "Answer stream timed out"
                    );
                    Err(StreamError::Cancelled(format!(
                        "no end of stream within {}s",
                        limit.as_secs()
                    )))
                }
            },
            None => streamed.await,
        }
    }

    async fn open_and_run<S>(
        &self,
        request: &StreamRequest,
        sinks: &mut S,
    ) -> vocalis_stream::Result<String>
    where
        S: EventSink + ?Sized,
    {
        let url = self.url(request.path());
        tracing::info!(profile = request.profile.as_str(), %url, "Opening answer stream");

        let response = self
            .http_client
            .post(&url)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Answer stream rejected");
            return Err(StreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut source = ByteStreamSource::new(Box::pin(response.bytes_stream()));
        run(&mut source, sinks).await
    }

    /// Plain chat answer (`/api/ask`)
    pub async fn ask_stream<S>(
        &self,
        prompt: &str,
        sinks: &mut S,
    ) -> vocalis_stream::Result<String>
    where
        S: EventSink + ?Sized,
    {
        self.stream(&StreamRequest::chat(prompt), sinks).await
    }

    /// Web-search-augmented answer (`/api/search`)
    pub async fn search_stream<S>(
        &self,
        query: &str,
        sinks: &mut S,
    ) -> vocalis_stream::Result<String>
    where
        S: EventSink + ?Sized,
    {
        self.stream(&StreamRequest::search(query), sinks).await
    }

    /// Probe `/health`, then `/debug/env` on a best-effort basis
    pub async fn ping(&self) -> Result<HealthStatus> {
        let response = self
            .with_timeout(self.http_client.get(self.url(HEALTH_PATH)))
            .send()
            .await
            .context("Backend health check failed")?;

        let status = response.status().as_u16();
        let body = response.text().await.context("Failed to read health response")?;
        tracing::info!(status, %body, "Health check");

        let env = match self.probe_env().await {
            Ok(env) => Some(env),
            Err(e) => {
                tracing::warn!(error = %e, "Environment probe failed (ignored)");
                None
            }
        };

        Ok(HealthStatus { status, body, env })
    }

    async fn probe_env(&self) -> Result<Value> {
        let response = self
            .with_timeout(self.http_client.get(self.url(ENV_PROBE_PATH)))
            .send()
            .await?;

        let status = response.status();
        let env = response.json::<Value>().await.unwrap_or_else(|_| serde_json::json!({}));
        tracing::debug!(%status, %env, "Environment probe");
        Ok(env)
    }

    /// Upload a recording for speech-to-text
    ///
    /// The audio is sent as is. Returns an empty string when the backend
    /// recognized nothing.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        let part = Part::bytes(audio)
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)
            .context("Invalid audio MIME type")?;
        let form = Form::new().part("audio", part);

        let response = self
            .with_timeout(self.http_client.post(self.url(STT_PATH)))
            .multipart(form)
            .send()
            .await
            .context("Failed to send STT request")?;

        let status = response.status();
        if !status.is_success() {
            bail!("STT failed: {}", status.as_u16());
        }

        let transcription: Transcription = response
            .json()
            .await
            .context("Failed to parse STT response")?;

        Ok(transcription.text.unwrap_or_default())
    }

    /// Synthesize speech for `text`
    ///
    /// Falls back to the configured voice when `voice` is `None`.
    pub async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<SpeechAudio> {
        let payload = SpeechRequest {
            text,
            voice: voice.or(self.default_voice.as_deref()),
        };

        let response = self
            .with_timeout(self.http_client.post(self.url(TTS_PATH)))
            .json(&payload)
            .send()
            .await
            .context("Failed to send TTS request")?;

        let status = response.status();
        if !status.is_success() {
            bail!("TTS failed: {}", status.as_u16());
        }

        response
            .json::<SpeechAudio>()
            .await
            .context("Failed to parse TTS response")
    }
}
