use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pricefloor::app::AppContext;
use pricefloor::cli::{commands, Cli, Commands};
use pricefloor::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pricefloor=info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { test } => {
            config.test_mode |= test;
            let ctx = AppContext::new(config)?;
            commands::run(&ctx).await?;
        }
        Commands::Resolve { links, test } => {
            config.test_mode |= test;
            let ctx = AppContext::new(config)?;
            commands::resolve(&ctx, &links).await?;
        }
        Commands::Authorize { refresh_token } => {
            let ctx = AppContext::new(config)?;
            commands::authorize(&ctx, &refresh_token)?;
        }
    }

    Ok(())
}
