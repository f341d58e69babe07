pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    AnalyzeDocumentUseCase, ChatSession, Conversation, FragmentStream, GenerativeClient,
    StreamChatUseCase, TurnOutcome,
};

pub use cli::{Commands, OutputFormat};

pub use connector::api::{Container, ContainerConfig, Router};
pub use connector::{GeminiChatSession, GeminiClient, MockGenerativeClient, SseDecoder};

pub use domain::{
    CategoryIcon, ChatConfig, ChatMessage, ClassificationOutput, DomainError, GenerateRequest,
    GenerationConfig, PriorityLevel, Sender,
};
