mod cli;
mod config;
mod error;
mod llm;
mod review;
mod server;
mod types;
mod validate;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, InitArgs, ServeArgs};
use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match &cli.command {
        Commands::Init(args) => init(args),
        Commands::Serve(args) => serve(args).await,
    }
}

fn init(args: &InitArgs) -> anyhow::Result<()> {
    if std::path::Path::new(&args.config).exists() && !args.r#override {
        anyhow::bail!(
            "{} already exists (use --override to replace it)",
            args.config
        );
    }
    std::fs::write(&args.config, config::DEFAULT_CONFIG)?;
    info!("Wrote {}", args.config);
    Ok(())
}

async fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let model = llm::OpenAiClient::new(&config.llm, &args.api_key)?;
    let pipeline = review::orchestrator::ReviewPipeline::new(Arc::new(model), &config.review);
    let state = Arc::new(server::AppState { pipeline });

    let bind = args.bind.as_deref().unwrap_or(&config.server.bind);
    server::serve(state, bind).await
}
