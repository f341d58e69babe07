pub mod analyze_controller;
pub mod categorize_controller;
pub mod chat_controller;

pub use analyze_controller::{render_classification, AnalyzeController};
pub use categorize_controller::CategorizeController;
pub use chat_controller::ChatController;
