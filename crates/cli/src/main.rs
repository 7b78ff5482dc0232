use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::EnvFilter,
};

use {
    gembot_config::Settings,
    gembot_gateway::AppState,
    gembot_gemini::GeminiClient,
};

#[derive(Parser)]
#[command(name = "gembot", about = "Gembot — WhatsApp to Gemini webhook relay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default when no subcommand is provided).
    Serve,
    /// Gemini file-store maintenance.
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },
}

#[derive(Subcommand)]
enum FilesAction {
    /// Delete every file in the Gemini file store.
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Pick up a local .env before reading settings; missing files are fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let settings = Settings::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(
                bind = %settings.bind,
                port = settings.port,
                model = %settings.model_name,
                "starting gembot"
            );
            gembot_gateway::start(AppState::new(settings)).await
        },
        Commands::Files {
            action: FilesAction::Sweep,
        } => {
            let gemini =
                GeminiClient::new(settings.model_name.clone(), settings.gen_api_key.clone());
            let removed = gemini.sweep_files().await?;
            println!("Removed {removed} file(s) from the Gemini file store.");
            Ok(())
        },
    }
}
