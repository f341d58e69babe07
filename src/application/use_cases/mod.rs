mod analyze_document;
mod conversation;
mod stream_chat;

pub use analyze_document::*;
pub use conversation::*;
pub use stream_chat::*;
