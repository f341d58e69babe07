use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a document and suggest where to route it
    Analyze {
        /// File to read; omit or pass `-` to read standard input
        path: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Interactive chat with the assistant (`/reset`, `/history`, `/exit`)
    Chat,

    /// Send a single chat message and stream the reply
    Ask { message: String },

    /// Show the icon hint the result view uses for a category label
    Categorize { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
