use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::{future, stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::application::{ChatSession, FragmentStream, GenerativeClient};
use crate::domain::{ChatConfig, DomainError, GenerateRequest};

type ChatReply = Vec<Result<String, DomainError>>;

/// Offline [`GenerativeClient`].
///
/// Scripted responses are served first, in order. Once a script runs dry the
/// client falls back to deterministic output: a fenced classification record
/// whose `document_id` is derived from the prompt, and an echo of each chat
/// message split into word fragments.
pub struct MockGenerativeClient {
    configured: bool,
    generate_script: Mutex<VecDeque<Result<String, DomainError>>>,
    chat_script: Arc<Mutex<VecDeque<ChatReply>>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
    chat_configs: Mutex<Vec<ChatConfig>>,
    sent_messages: Arc<Mutex<Vec<String>>>,
    sessions_started: AtomicUsize,
}

impl MockGenerativeClient {
    pub fn new() -> Self {
        Self {
            configured: true,
            generate_script: Mutex::new(VecDeque::new()),
            chat_script: Arc::new(Mutex::new(VecDeque::new())),
            generate_requests: Mutex::new(Vec::new()),
            chat_configs: Mutex::new(Vec::new()),
            sent_messages: Arc::new(Mutex::new(Vec::new())),
            sessions_started: AtomicUsize::new(0),
        }
    }

    /// A client with no credential: every flow fails with a configuration error.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn with_generate_response(mut self, response: Result<String, DomainError>) -> Self {
        self.generate_script
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    pub fn with_chat_reply(self, fragments: ChatReply) -> Self {
        lock(&self.chat_script).push_back(fragments);
        self
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        lock(&self.generate_requests).clone()
    }

    pub fn chat_configs(&self) -> Vec<ChatConfig> {
        lock(&self.chat_configs).clone()
    }

    /// Every chat message sent, across all sessions.
    pub fn sent_messages(&self) -> Vec<String> {
        lock(&self.sent_messages).clone()
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions_started.load(Ordering::SeqCst)
    }

    fn canned_classification(prompt: &str) -> String {
        let mut hasher = DefaultHasher::new();
        prompt.hash(&mut hasher);

        format!(
            "```json\n{}\n```",
            serde_json::json!({
                "document_id": format!("mock-{:016x}", hasher.finish()),
                "primary_classification": "Other",
                "secondary_classification": "N/A",
                "confidence_score": "50",
                "routing_destination": "Document Processing Team",
                "alternative_routing": "N/A",
                "priority_level": "Low",
                "processing_notes": "Generated offline by the mock client; no model was consulted.",
                "required_actions": ["Re-run the analysis against the live service"],
                "human_review_required": "true",
                "sensitive_content_detected": "false",
                "estimated_processing_time": "N/A"
            })
        )
    }
}

impl Default for MockGenerativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeClient for MockGenerativeClient {
    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.configured {
            Ok(())
        } else {
            Err(DomainError::config(
                "API key is not configured for the mock client.",
            ))
        }
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError> {
        self.ensure_configured()?;

        let scripted = lock(&self.generate_script).pop_front();
        let response = match scripted {
            Some(response) => response,
            None => Ok(Self::canned_classification(&request.prompt)),
        };

        debug!("Mock generate for model {} ({} byte prompt)", request.model, request.prompt.len());
        lock(&self.generate_requests).push(request);
        response
    }

    fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, DomainError> {
        self.ensure_configured()?;

        self.sessions_started.fetch_add(1, Ordering::SeqCst);
        lock(&self.chat_configs).push(config);

        Ok(Box::new(MockChatSession {
            id: Uuid::new_v4().to_string(),
            script: Arc::clone(&self.chat_script),
            sent_messages: Arc::clone(&self.sent_messages),
            turns: Arc::new(AtomicUsize::new(0)),
        }))
    }
}

struct MockChatSession {
    id: String,
    script: Arc<Mutex<VecDeque<ChatReply>>>,
    sent_messages: Arc<Mutex<Vec<String>>>,
    turns: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatSession for MockChatSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn turn_count(&self) -> usize {
        self.turns.load(Ordering::SeqCst)
    }

    async fn send_message_stream(&mut self, message: &str) -> Result<FragmentStream, DomainError> {
        lock(&self.sent_messages).push(message.to_string());

        let fragments = lock(&self.script).pop_front().unwrap_or_else(|| {
            format!("You said: {message}")
                .split_inclusive(' ')
                .map(|word| Ok(word.to_string()))
                .collect()
        });

        let succeeded = fragments.iter().all(Result::is_ok);
        let turns = Arc::clone(&self.turns);
        // Record the turn only after the last fragment has been consumed.
        let commit = stream::once(async move {
            if succeeded {
                turns.fetch_add(1, Ordering::SeqCst);
            }
            None::<Result<String, DomainError>>
        })
        .filter_map(future::ready);

        Ok(stream::iter(fragments).chain(commit).boxed())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
