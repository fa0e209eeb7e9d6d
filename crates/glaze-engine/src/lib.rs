use std::env;
use std::time::Duration;

use reqwest::blocking::multipart::{Form as MultipartForm, Part as MultipartPart};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use glaze_contracts::requests::BinaryPart;
use glaze_contracts::{
    GenerationRequest, ModelKind, NormalizedRequest, UnsupportedModel, ValidationError,
};

pub const DEFAULT_API_BASE: &str = "https://api.stability.ai";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a call can fail with, as distinct, non-overlapping kinds.
/// None of these are retried internally; translating them into
/// user-visible text is the presentation layer's job.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A field or cross-field rule was violated; nothing reached the wire.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The model-type tag is not one this client supports.
    #[error(transparent)]
    UnsupportedModel(#[from] UnsupportedModel),

    /// The call failed before any response arrived (connect, DNS, timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered with a non-2xx status.
    #[error("remote error ({status}): {message}")]
    Remote {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Client construction failed (missing key, bad base URL). Never
    /// produced by a dispatch.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The payload of a completed generation: raw bytes straight off the wire
/// plus the content type the remote declared for them.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How a call to the remote resolved.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// 200: the generated media, verbatim.
    Complete(Artifact),
    /// 202: the job is queued remotely. Polling cadence is the caller's
    /// business; [`Client::fetch_result`] does a single lookup.
    InProgress { id: Option<String> },
}

/// Synchronous client for the generative-media API.
///
/// Explicitly constructed and explicitly passed: one value, no ambient
/// global state. Each call is a single bounded POST or GET with no retry,
/// no caching and no cross-call coordination; concurrent use from multiple
/// threads only shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    api_base: String,
    api_key: String,
    http: HttpClient,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Result<Self, EngineError> {
        Self::with_options(api_key, DEFAULT_API_BASE, DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let api_base = api_base.into().trim().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(EngineError::Config("api base URL must not be empty".to_string()));
        }
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            api_base,
            api_key: api_key.into(),
            http,
        })
    }

    /// Reads `STABILITY_API_KEY` and optionally `STABILITY_API_BASE`.
    pub fn from_env() -> Result<Self, EngineError> {
        let Some(api_key) = non_empty_env("STABILITY_API_KEY") else {
            return Err(EngineError::Config("STABILITY_API_KEY not set".to_string()));
        };
        let api_base =
            non_empty_env("STABILITY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::with_options(api_key, api_base, DEFAULT_TIMEOUT)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Validates, normalizes and dispatches a request in one step.
    pub fn generate(&self, request: GenerationRequest) -> Result<Outcome, EngineError> {
        let normalized = request.normalize()?;
        self.dispatch(normalized)
    }

    /// Issues the single POST for an already-normalized request.
    pub fn dispatch(&self, request: NormalizedRequest) -> Result<Outcome, EngineError> {
        let url = format!("{}{}", self.api_base, endpoint_path(request.kind));
        let accept = accept_hint(request.kind);

        let mut form = MultipartForm::new();
        for (key, value) in request.fields {
            form = form.text(key, value);
        }
        let has_binary = !request.binaries.is_empty();
        for part in request.binaries {
            form = form.part(part.name, file_part(part)?);
        }
        if !has_binary {
            // The remote requires multipart encoding even for pure-text
            // payloads; an empty `none` part keeps the body well-formed.
            form = form.part("none", MultipartPart::bytes(Vec::new()));
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, accept)
            .multipart(form)
            .send()?;
        interpret(response)
    }

    /// Looks up an async generation once. A 202 here means still queued.
    pub fn fetch_result(&self, generation_id: &str) -> Result<Outcome, EngineError> {
        let generation_id = generation_id.trim();
        if generation_id.is_empty() {
            return Err(ValidationError::new("id", "generation id must not be empty").into());
        }
        let url = format!("{}/v2beta/results/{generation_id}", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "image/*")
            .send()?;
        interpret(response)
    }
}

fn endpoint_path(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Core => "/v2beta/stable-image/generate/core",
        ModelKind::Sd35 => "/v2beta/stable-image/generate/sd3",
        ModelKind::Ultra => "/v2beta/stable-image/generate/ultra",
        ModelKind::Sketch => "/v2beta/stable-image/control/sketch",
        ModelKind::Structure => "/v2beta/stable-image/control/structure",
        ModelKind::StyleGuide => "/v2beta/stable-image/control/style",
        ModelKind::StyleTransfer => "/v2beta/stable-image/control/style-transfer",
        ModelKind::TextToAudio => "/v2beta/audio/stable-audio-2/text-to-audio",
        ModelKind::AudioToAudio => "/v2beta/audio/stable-audio-2/audio-to-audio",
        ModelKind::Fast3d => "/v2beta/3d/stable-fast-3d",
        ModelKind::PointAware3d => "/v2beta/3d/stable-point-aware-3d",
    }
}

// The remote ignores the hint on the 3D endpoints and always returns the
// model binary, so those keep the image/* default.
fn accept_hint(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::TextToAudio | ModelKind::AudioToAudio => "audio/*",
        _ => "image/*",
    }
}

fn file_part(part: BinaryPart) -> Result<MultipartPart, EngineError> {
    let file_name = attachment_file_name(part.name, &part.mime);
    let built = MultipartPart::bytes(part.bytes)
        .file_name(file_name)
        .mime_str(&part.mime)?;
    Ok(built)
}

fn attachment_file_name(name: &str, mime: &str) -> String {
    let ext = match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/png" => "png",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" => "wav",
        _ => "bin",
    };
    format!("{name}.{ext}")
}

/// Classifies a raw HTTP response: 200 carries the media, 202 means the
/// job is queued, everything else is a remote-reported failure.
fn interpret(response: HttpResponse) -> Result<Outcome, EngineError> {
    let status = response.status().as_u16();
    match status {
        200 => {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = response.bytes()?.to_vec();
            Ok(Outcome::Complete(Artifact {
                bytes,
                content_type,
            }))
        }
        202 => {
            let body = response.text().unwrap_or_default();
            let id = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
            Ok(Outcome::InProgress { id })
        }
        status => {
            let body = response.text().unwrap_or_default();
            let parsed: Option<Value> = serde_json::from_str(&body).ok();
            let message = parsed
                .as_ref()
                .and_then(remote_message)
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        format!("HTTP {status} error")
                    } else {
                        truncate_text(body.trim(), 512)
                    }
                });
            Err(EngineError::Remote {
                status,
                message,
                body: parsed,
            })
        }
    }
}

fn remote_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(message.to_string());
    }
    let errors = body
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<&str>>();
    if errors.is_empty() {
        return None;
    }
    Some(errors.join("; "))
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
