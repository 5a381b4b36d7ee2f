use clap::Parser;
use family_ledger::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,family_ledger=debug")),
        )
        .init();

    let config = family_ledger::config::config().clone();
    tracing::info!("Starting Family Ledger in {:?} mode", config.environment);

    let cli = Cli::parse();
    if let Err(e) = family_ledger::cli::run(cli, config).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}
