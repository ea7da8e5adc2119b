use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caseguard::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caseguard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Login {
            token,
            response,
            status,
        } => cli::commands::login(config, token, response.as_deref(), status).await,
        Commands::Logout => cli::commands::logout(config).await,
        Commands::Whoami { format } => cli::commands::whoami(config, format).await,
        Commands::Status => cli::commands::status(config).await,
        Commands::Check { route } => cli::commands::check(config, &route).await,
        Commands::Watch { interval } => cli::commands::watch(config, interval).await,
    }
}
