mod gemini_client;
mod mock_generative_client;
mod sse;

pub use gemini_client::*;
pub use mock_generative_client::*;
pub use sse::*;
