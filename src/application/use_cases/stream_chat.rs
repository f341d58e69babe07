use std::sync::Arc;

use tracing::{debug, info};

use crate::application::prompts::GENERAL_CHAT_PROMPT;
use crate::application::{ChatSession, FragmentStream, GenerativeClient};
use crate::domain::{ChatConfig, ChatMessage, DomainError, GenerationConfig};

const CHAT_TEMPERATURE: f32 = 0.7;

/// Streams chat replies through one lazily created session.
///
/// The session is the single source of conversational context: it is created
/// on the first call, reused for every later turn, and dropped only by
/// [`StreamChatUseCase::reset_session`].
pub struct StreamChatUseCase {
    client: Arc<dyn GenerativeClient>,
    config: ChatConfig,
    session: Option<Box<dyn ChatSession>>,
}

impl StreamChatUseCase {
    pub fn new(client: Arc<dyn GenerativeClient>, model: impl Into<String>) -> Self {
        let config = ChatConfig::new(model)
            .with_system_instruction(GENERAL_CHAT_PROMPT)
            .with_generation(GenerationConfig::new().with_temperature(CHAT_TEMPERATURE));
        Self::with_config(client, config)
    }

    pub fn with_config(client: Arc<dyn GenerativeClient>, config: ChatConfig) -> Self {
        Self {
            client,
            config,
            session: None,
        }
    }

    /// Send `message` and stream the reply fragments.
    ///
    /// `prior_history` is the caller's view of the transcript. It is not sent
    /// upstream: the session already holds every completed turn, and an edited
    /// or trimmed history cannot rewrite it.
    pub async fn stream_reply(
        &mut self,
        message: &str,
        prior_history: &[ChatMessage],
    ) -> Result<FragmentStream, DomainError> {
        self.client.ensure_configured()?;

        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session = self.client.start_chat(self.config.clone())?;
                info!("Started chat session {}", session.id());
                session
            }
        };
        let session = self.session.insert(session);

        debug!(
            "Sending chat message on session {} ({} remembered turns, caller transcript has {} entries)",
            session.id(),
            session.turn_count(),
            prior_history.len()
        );

        session.send_message_stream(message).await
    }

    /// Forget the current session; the next message starts a new one with no
    /// memory of earlier turns.
    pub fn reset_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Discarded chat session {}", session.id());
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_deref().map(|s| s.id())
    }

    pub fn remembered_turns(&self) -> usize {
        self.session.as_deref().map_or(0, |s| s.turn_count())
    }
}
