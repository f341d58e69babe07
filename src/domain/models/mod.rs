mod category;
mod chat_message;
mod classification;
mod generation;

pub use category::*;
pub use chat_message::*;
pub use classification::*;
pub use generation::*;
