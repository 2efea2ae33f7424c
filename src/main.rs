use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use harvest::app::AppContext;
use harvest::cli::{commands, Cli, Commands};
use harvest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    match cli.command {
        Commands::Collect => {
            let ctx = AppContext::new(config).await?;
            let result = commands::collect(&ctx).await;
            ctx.shutdown().await?;
            result?;
        }
        Commands::Parse => {
            let ctx = AppContext::new(config).await?;
            let result = commands::parse(&ctx).await;
            ctx.shutdown().await?;
            result?;
        }
        Commands::Status => commands::status(&config)?,
        Commands::MergeLinks => commands::merge_all_links(&config)?,
        Commands::MergeResults => commands::merge_all_results(&config)?,
    }

    Ok(())
}
