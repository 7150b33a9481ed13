use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wardgate::{config::Config, migration, server};

#[derive(Parser)]
#[command(name = "wardgate", version, about = "Edge gateway and identity service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the identity server (registration, login, locations)
    Identity,
    /// Run the gateway server (routing and forwarding)
    Gateway,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Identity => {
            info!("Starting identity server");
            server::run_identity(config).await
        }
        Command::Gateway => {
            info!("Starting gateway server");
            server::run_gateway(config).await
        }
        Command::Migrate => migration::run_migrations(&config).await,
    }
}
