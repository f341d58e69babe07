use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use docroute::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "docroute")]
#[command(author, version, about = "Document classification and routing assistant", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use the deterministic offline client; no API key or network needed
    #[arg(long, global = true)]
    mock: bool,

    /// Model identifier (defaults to GEMINI_MODEL, then the built-in model)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Service root (defaults to GEMINI_BASE_URL, then the public endpoint)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // stdout carries results and streamed replies; logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        mock: cli.mock,
        model: cli.model,
        base_url: cli.base_url,
    });
    let router = Router::new(&container);

    let output = router.route(cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
