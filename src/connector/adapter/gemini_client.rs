use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{ChatSession, FragmentStream, GenerativeClient};
use crate::connector::adapter::SseDecoder;
use crate::domain::{ChatConfig, DomainError, GenerateRequest, GenerationConfig};

/// Public Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
/// Fragments buffered between the stream reader task and the consumer.
const FRAGMENT_BUFFER: usize = 32;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Content {
    role: String,
    parts: Vec<TextPart>,
}

impl Content {
    fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<SystemPart<'a>>,
}

#[derive(Serialize)]
struct SystemPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
}

impl<'a> From<&'a GenerationConfig> for WireGenerationConfig<'a> {
    fn from(config: &'a GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            response_mime_type: config.response_mime_type.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: WireGenerationConfig<'a>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(
        contents: &'a [Content],
        system: Option<&'a str>,
        generation: &'a GenerationConfig,
    ) -> Self {
        Self {
            contents,
            system_instruction: system.map(|text| SystemInstruction {
                parts: vec![SystemPart { text }],
            }),
            generation_config: generation.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Gemini `generateContent` API.
///
/// Implements [`GenerativeClient`]; chat sessions created by it stream over
/// `streamGenerateContent` with server-sent events.
///
/// Configuration is read from the environment by [`GeminiClient::from_env`]:
///
/// | Variable          | Default                                      | Purpose              |
/// |-------------------|----------------------------------------------|----------------------|
/// | `API_KEY`         | falls back to `GEMINI_API_KEY`               | Credential           |
/// | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com`  | Alternate endpoint   |
/// | `GEMINI_MODEL`    | `gemini-2.5-flash-preview-04-17`             | Model identifier     |
///
/// A missing key does not prevent construction; every call then fails with
/// [`DomainError::ConfigError`] before any request is made.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Self::configured_api_key(), Self::configured_base_url())
    }

    pub fn configured_api_key() -> Option<String> {
        std::env::var("API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn configured_base_url() -> String {
        std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }

    pub fn configured_model() -> String {
        std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    fn api_key(&self) -> Result<&str, DomainError> {
        self.api_key.as_deref().ok_or_else(|| {
            DomainError::config(
                "Gemini API key is not configured. Set the API_KEY environment variable.",
            )
        })
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    fn ensure_configured(&self) -> Result<(), DomainError> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError> {
        let api_key = self.api_key()?;

        let contents = [Content::user(request.prompt)];
        let body = GenerateContentRequest::new(&contents, None, &request.config);
        let url = self.endpoint(&request.model, "generateContent");

        debug!("GeminiClient: POST {}", url);
        let response = send_json(
            self.http.post(&url).timeout(GENERATE_TIMEOUT),
            api_key,
            &body,
        )
        .await?;

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            DomainError::upstream(format!("GeminiClient: failed to parse response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(DomainError::upstream(error.message));
        }

        Ok(parsed.text())
    }

    fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, DomainError> {
        let api_key = self.api_key()?.to_string();
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&config.model, "streamGenerateContent")
        );

        Ok(Box::new(GeminiChatSession {
            id: Uuid::new_v4().to_string(),
            http: self.http.clone(),
            api_key,
            url,
            system_instruction: config.system_instruction,
            generation: config.generation,
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }
}

// ============================================================================
// Chat session
// ============================================================================

/// A conversation held client-side: every completed turn is replayed as
/// `contents` on the next request.
pub struct GeminiChatSession {
    id: String,
    http: reqwest::Client,
    api_key: String,
    url: String,
    system_instruction: Option<String>,
    generation: GenerationConfig,
    history: Arc<Mutex<Vec<Content>>>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn turn_count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
            / 2
    }

    async fn send_message_stream(&mut self, message: &str) -> Result<FragmentStream, DomainError> {
        let user_turn = Content::user(message);
        let mut contents = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        contents.push(user_turn.clone());

        let body = GenerateContentRequest::new(
            &contents,
            self.system_instruction.as_deref(),
            &self.generation,
        );
        let response = send_json(self.http.post(&self.url), &self.api_key, &body).await?;

        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        let history = Arc::clone(&self.history);
        let session_id = self.id.clone();

        tokio::spawn(async move {
            match forward_fragments(response, &tx).await {
                // The service rejects empty model parts, so a blocked or
                // empty reply must not be replayed on later turns.
                Ok(Some(reply)) if reply.is_empty() => {
                    debug!("Session {}: empty reply, turn not recorded", session_id);
                }
                Ok(Some(reply)) => {
                    let mut history = history.lock().unwrap_or_else(PoisonError::into_inner);
                    history.push(user_turn);
                    history.push(Content::model(reply));
                    debug!("Session {} now holds {} turns", session_id, history.len() / 2);
                }
                Ok(None) => {
                    debug!("Session {}: reply stream dropped by consumer, turn not recorded", session_id);
                }
                Err(e) => {
                    warn!("Session {}: stream failed: {}", session_id, e);
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        Ok(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }
}

/// Read the SSE body, forwarding each text fragment. Returns the full reply,
/// or `None` when the consumer went away before the end.
async fn forward_fragments(
    response: reqwest::Response,
    tx: &mpsc::Sender<Result<String, DomainError>>,
) -> Result<Option<String>, DomainError> {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut reply = String::new();

    loop {
        let (payloads, done) = match body.next().await {
            Some(chunk) => {
                let chunk = chunk.map_err(|e| {
                    DomainError::upstream(format!("GeminiClient: stream interrupted: {e}"))
                })?;
                (decoder.push(&chunk), false)
            }
            None => (decoder.finish(), true),
        };

        for payload in payloads {
            if let Some(fragment) = decode_stream_event(&payload)? {
                reply.push_str(&fragment);
                if tx.send(Ok(fragment)).await.is_err() {
                    return Ok(None);
                }
            }
        }

        if done {
            if tx.is_closed() {
                return Ok(None);
            }
            return Ok(Some(reply));
        }
    }
}

/// Text carried by one stream event, if any.
fn decode_stream_event(payload: &str) -> Result<Option<String>, DomainError> {
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    let event: GenerateContentResponse = serde_json::from_str(payload).map_err(|e| {
        DomainError::upstream(format!("GeminiClient: malformed stream event: {e}"))
    })?;
    if let Some(error) = event.error {
        return Err(DomainError::upstream(error.message));
    }

    let text = event.text();
    Ok((!text.is_empty()).then_some(text))
}

async fn send_json<T: Serialize + ?Sized>(
    builder: reqwest::RequestBuilder,
    api_key: &str,
    body: &T,
) -> Result<reqwest::Response, DomainError> {
    let response = builder
        .header(API_KEY_HEADER, api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| DomainError::upstream(format!("GeminiClient: request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("GeminiClient: API returned {status}: {body}");
        let detail = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        return Err(DomainError::upstream(format!(
            "GeminiClient: API returned {status}: {detail}"
        )));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_gemini_field_names() {
        let contents = [Content::user("classify this")];
        let config = GenerationConfig::new()
            .with_temperature(0.2)
            .with_top_p(0.9)
            .with_top_k(40)
            .with_json_response();
        let body = GenerateContentRequest::new(&contents, Some("be brief"), &config);

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "classify this");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!((json["generationConfig"]["topP"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_unset_sampling_fields_are_omitted() {
        let contents = [Content::user("hi")];
        let config = GenerationConfig::new().with_temperature(0.7);
        let json = serde_json::to_value(GenerateContentRequest::new(&contents, None, &config))
            .expect("serialize");

        let generation = json["generationConfig"].as_object().expect("object");
        assert_eq!(generation.len(), 1);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_joins_parts_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [
                {"text": "thinking...", "thought": true},
                {"text": "{\"a\":"},
                {"text": " 1}"}
            ]}}]}"#,
        )
        .expect("deserialize");
        assert_eq!(response.text(), "{\"a\": 1}");
    }

    #[test]
    fn test_blocked_response_has_empty_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
                .expect("deserialize");
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_decode_stream_event() {
        let event = r#"{"candidates": [{"content": {"parts": [{"text": "Hi"}]}}]}"#;
        assert_eq!(decode_stream_event(event).unwrap(), Some("Hi".to_string()));
        assert_eq!(decode_stream_event("[DONE]").unwrap(), None);
        assert_eq!(
            decode_stream_event(r#"{"candidates": [{"finishReason": "STOP"}]}"#).unwrap(),
            None
        );

        let err = decode_stream_event(r#"{"error": {"code": 429, "message": "quota exceeded"}}"#)
            .unwrap_err();
        assert!(err.is_upstream_error());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let client = GeminiClient::new(None, DEFAULT_BASE_URL);
        assert!(client.ensure_configured().unwrap_err().is_config_error());

        let blank = GeminiClient::new(Some("  ".to_string()), DEFAULT_BASE_URL);
        assert!(blank.ensure_configured().is_err());

        assert!(client
            .start_chat(ChatConfig::new(DEFAULT_MODEL))
            .err()
            .is_some_and(|e| e.is_config_error()));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(Some("key".to_string()), "http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.endpoint("m", "generateContent"),
            "http://localhost:8080/v1beta/models/m:generateContent"
        );
    }
}
