use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AnalyzeController, CategorizeController, ChatController};

pub struct Router<'a> {
    analyze_controller: AnalyzeController<'a>,
    chat_controller: ChatController<'a>,
    categorize_controller: CategorizeController,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            analyze_controller: AnalyzeController::new(container),
            chat_controller: ChatController::new(container),
            categorize_controller: CategorizeController::new(),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Analyze { path, format } => self.analyze_controller.analyze(path, format).await,
            Commands::Chat => self.chat_controller.chat().await,
            Commands::Ask { message } => self.chat_controller.ask(message).await,
            Commands::Categorize { label } => self.categorize_controller.categorize(label),
        }
    }
}
