use clap::Parser;
use clap::Subcommand;
use credirag::config::AppConfig;
use credirag::health::HealthChecker;
use credirag::rag::RagSystem;
use credirag::Result;

#[derive(Parser)]
#[command(name = "credirag")]
#[command(about = "Complaint analysis over a pre-built vector index")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to config.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for browser clients
        #[arg(long)]
        cors: bool,
    },
    /// Answer a single question and print the sources
    Ask {
        /// The question to answer
        question: String,
    },
    /// Check index reachability and retrieval health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Serve { host, port, cors } => {
            credirag::logging::init_logging_with_config(Some(&config))?;
            let host = host.unwrap_or_else(|| config.api.host.clone());
            let port = port.unwrap_or(config.api.port);
            let cors = cors || config.api.enable_cors;
            credirag::api::serve_api(&config, host, port, cors).await?;
        }
        Commands::Ask { question } => {
            credirag::logging::init_simple_logging()?;
            let rag = RagSystem::new(&config).await?;
            let result = rag.answer_question(&question).await?;
            println!("{}", result.format());
        }
        Commands::Health => {
            credirag::logging::init_simple_logging()?;
            let rag = RagSystem::new(&config).await?;
            let checker = HealthChecker::new(std::sync::Arc::new(rag));
            let status = checker.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
