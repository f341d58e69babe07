use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{ChatConfig, DomainError, GenerateRequest};

/// Text fragments of one streamed reply, in arrival order.
///
/// The stream ends when the upstream stream ends. An `Err` item is terminal:
/// fragments already yielded stay valid, nothing follows it.
pub type FragmentStream = BoxStream<'static, Result<String, DomainError>>;

/// Client for a hosted generative-model service.
///
/// Implementors own transport, authentication and wire formats. Use cases
/// only see prompts in and text out.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Fails with [`DomainError::ConfigError`] when no credential is available.
    /// Callers check this before doing any work so a missing key never
    /// reaches the network.
    fn ensure_configured(&self) -> Result<(), DomainError>;

    /// Single non-streamed completion. Returns the concatenated text of the
    /// first candidate, which may be empty.
    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError>;

    /// Open a new conversational session with no prior turns.
    fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, DomainError>;
}

/// A multi-turn conversation whose context is held by the session itself.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Stable identifier of this session handle.
    fn id(&self) -> &str;

    /// Number of completed turns the session remembers.
    fn turn_count(&self) -> usize;

    /// Send one user message and stream the reply.
    ///
    /// The turn is added to the session context only once the reply stream
    /// has finished successfully.
    async fn send_message_stream(&mut self, message: &str) -> Result<FragmentStream, DomainError>;
}
