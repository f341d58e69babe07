use futures_util::StreamExt;
use tracing::{info, warn};

use crate::application::use_cases::StreamChatUseCase;
use crate::domain::{ChatMessage, DomainError};

/// What happened to one submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was sent or recorded.
    Ignored,
    Completed,
    /// The turn failed; an error entry was appended to the transcript.
    Failed,
}

/// Owns the visible transcript and drives one chat turn at a time.
///
/// The transcript is append-only. During a turn the AI entry's text is
/// rewritten after every fragment with everything received so far. Failures
/// are recorded as an extra AI entry rather than dropping the turn.
/// `send` takes `&mut self`, so a second turn cannot start while one is
/// streaming.
pub struct Conversation {
    chat: StreamChatUseCase,
    messages: Vec<ChatMessage>,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new(chat: StreamChatUseCase) -> Self {
        Self {
            chat,
            messages: Vec::new(),
            last_error: None,
        }
    }

    /// Submit `text` as the next user turn. `on_update` sees the AI entry
    /// after each fragment is applied, with the fragment just received.
    pub async fn send<F>(&mut self, text: &str, mut on_update: F) -> TurnOutcome
    where
        F: FnMut(&ChatMessage, &str),
    {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(text));
        self.last_error = None;

        let mut stream = match self.chat.stream_reply(text, &history).await {
            Ok(stream) => stream,
            Err(e) => return self.record_failure(e),
        };

        self.messages.push(ChatMessage::ai(""));
        let ai_index = self.messages.len() - 1;
        let mut buffer = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    buffer.push_str(&fragment);
                    let message = &mut self.messages[ai_index];
                    message.set_text(buffer.as_str());
                    on_update(message, &fragment);
                }
                Err(e) => return self.record_failure(e),
            }
        }

        info!("Chat turn completed ({} characters)", buffer.len());
        TurnOutcome::Completed
    }

    /// Start a fresh upstream session. The transcript is kept.
    pub fn reset_session(&mut self) {
        self.chat.reset_session();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.chat.session_id()
    }

    fn record_failure(&mut self, error: DomainError) -> TurnOutcome {
        let message = error.to_string();
        warn!("Chat turn failed: {}", message);
        self.messages.push(ChatMessage::ai_error(&message));
        self.last_error = Some(message);
        TurnOutcome::Failed
    }
}
