//! # Application Layer
//!
//! Prompt templates, response parsing and the use cases that drive the
//! generative client: document analysis and streamed chat.

pub mod interfaces;
pub mod prompts;
pub mod response_parser;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
