use std::sync::Arc;

use tracing::debug;

use crate::application::{AnalyzeDocumentUseCase, Conversation, GenerativeClient, StreamChatUseCase};
use crate::connector::adapter::{GeminiClient, MockGenerativeClient};

pub struct ContainerConfig {
    /// Use the deterministic offline client instead of the Gemini API.
    pub mock: bool,
    /// Model identifier; `None` falls back to `GEMINI_MODEL` or the built-in default.
    pub model: Option<String>,
    /// Service root; `None` falls back to `GEMINI_BASE_URL` or the public endpoint.
    pub base_url: Option<String>,
}

pub struct Container {
    client: Arc<dyn GenerativeClient>,
    model: String,
}

impl Container {
    /// Wires the generative client. A missing API key is not an error here;
    /// the first analysis or chat turn reports it.
    pub fn new(config: ContainerConfig) -> Self {
        let model = config.model.unwrap_or_else(GeminiClient::configured_model);

        let client: Arc<dyn GenerativeClient> = if config.mock {
            debug!("Using mock generative client");
            Arc::new(MockGenerativeClient::new())
        } else {
            let base_url = config
                .base_url
                .unwrap_or_else(GeminiClient::configured_base_url);
            let gemini = GeminiClient::new(GeminiClient::configured_api_key(), base_url);
            debug!("Using Gemini at {} with model {}", gemini.base_url(), model);
            Arc::new(gemini)
        };

        Self { client, model }
    }

    /// Builds a container around an existing client.
    pub fn with_client(client: Arc<dyn GenerativeClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn analyze_use_case(&self) -> AnalyzeDocumentUseCase {
        AnalyzeDocumentUseCase::new(self.client.clone(), self.model.clone())
    }

    pub fn chat_use_case(&self) -> StreamChatUseCase {
        StreamChatUseCase::new(self.client.clone(), self.model.clone())
    }

    pub fn conversation(&self) -> Conversation {
        Conversation::new(self.chat_use_case())
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
